//! Save states: a point-in-time snapshot of CPU, PPU, APU, RAM, and
//! controller state, serialized with `serde`.
//!
//! Cartridge/mapper state is not captured — restoring a save state
//! assumes the same cartridge is already loaded via
//! [`System::load_cartridge`](crate::System::load_cartridge).

#[cfg(feature = "serde")]
mod state {
    use serde::{Deserialize, Serialize};

    use nesc_apu::Apu;
    use nesc_cpu::Cpu;
    use nesc_ppu::Ppu;

    use crate::controller::Controller;

    /// A complete, serializable snapshot of everything [`System`](crate::System)
    /// owns except the cartridge.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SaveState {
        /// CPU registers, status flags, and pending-interrupt state.
        pub cpu: Cpu,
        /// PPU registers, VRAM, OAM, and rendering pipeline latches.
        pub ppu: Ppu,
        /// APU channel and frame-sequencer state.
        pub apu: Apu,
        /// The 2KB internal work RAM.
        pub ram: [u8; 0x0800],
        /// Controller plugged into port 0.
        pub controller1: Controller,
        /// Controller plugged into port 1.
        pub controller2: Controller,
        /// Master clock ticks elapsed since the last reset.
        pub master_tick: u32,
    }
}

#[cfg(feature = "serde")]
pub use state::SaveState;

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn a_save_state_round_trips_through_a_serde_format() {
        let original = SaveState {
            cpu: nesc_cpu::Cpu::new(),
            ppu: nesc_ppu::Ppu::new(nesc_ppu::Mirroring::Vertical),
            apu: nesc_apu::Apu::new(),
            ram: [0x42; 0x0800],
            controller1: crate::controller::Controller::new(),
            controller2: crate::controller::Controller::new(),
            master_tick: 12345,
        };

        let encoded = serde_json::to_vec(&original).unwrap();
        let decoded: SaveState = serde_json::from_slice(&encoded).unwrap();

        assert_eq!(decoded.ram, original.ram);
        assert_eq!(decoded.master_tick, original.master_tick);
        assert_eq!(decoded.cpu.pc(), original.cpu.pc());
    }
}

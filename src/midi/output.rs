// MIDI output note player - drives any external synth over a MIDI port

use crate::audio::player::{NotePlayer, PlayerError};
use crate::midi::device::MidiDeviceManager;
use crate::midi::event::MidiEvent;
use crate::midi::names::Instrument;
use midir::MidiOutputConnection;

pub struct MidiOutputPlayer {
    connection: MidiOutputConnection,
    port_name: String,
}

impl MidiOutputPlayer {
    /// Connect to the first output port, or to `device_name` when given
    pub fn connect(device_name: Option<&str>) -> Result<Self, PlayerError> {
        let (midi_out, port) = MidiDeviceManager::new().open_output_port(device_name)?;
        let port_name = midi_out
            .port_name(&port)
            .unwrap_or_else(|_| "Unknown".to_string());

        let connection = midi_out
            .connect(&port, "padplay-output")
            .map_err(|e| PlayerError::Connection(e.to_string()))?;

        log::info!("Connected to MIDI output port: {}", port_name);

        Ok(Self {
            connection,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn select_instrument(&mut self, instrument: Instrument) {
        self.send_event(MidiEvent::ProgramChange {
            program: instrument.program(),
        });
    }

    fn send_event(&mut self, event: MidiEvent) {
        if let Err(e) = self.connection.send(&event.to_bytes()) {
            log::warn!("MIDI send failed for {:?}: {}", event, e);
        }
    }
}

impl NotePlayer for MidiOutputPlayer {
    fn play_note(&mut self, note: u8, velocity: u8) {
        self.send_event(MidiEvent::NoteOn { note, velocity });
    }

    fn stop_note(&mut self, note: u8) {
        self.send_event(MidiEvent::NoteOff { note });
    }
}

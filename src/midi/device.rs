// MIDI output device discovery

use crate::audio::player::PlayerError;
use midir::{MidiOutput as MidirOutput, MidiOutputPort};

const CLIENT_NAME: &str = "PadPlay MIDI Output";

#[derive(Clone, Debug)]
pub struct MidiDeviceInfo {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}

pub struct MidiDeviceManager;

impl MidiDeviceManager {
    pub fn new() -> Self {
        Self
    }

    /// List every MIDI output port currently visible
    pub fn list_output_ports(&self) -> Vec<MidiDeviceInfo> {
        let mut devices = Vec::new();

        if let Ok(midi_out) = MidirOutput::new("PadPlay MIDI Scanner") {
            for (index, port) in midi_out.ports().iter().enumerate() {
                if let Ok(name) = midi_out.port_name(port) {
                    devices.push(MidiDeviceInfo {
                        id: format!("midi_out_{}", index),
                        name,
                        is_default: index == 0,
                    });
                }
            }
        }

        devices
    }

    /// Open the first output port, or the one named `device_name`
    pub fn open_output_port(
        &self,
        device_name: Option<&str>,
    ) -> Result<(MidirOutput, MidiOutputPort), PlayerError> {
        let midi_out =
            MidirOutput::new(CLIENT_NAME).map_err(|e| PlayerError::Init(e.to_string()))?;
        let ports = midi_out.ports();

        let port = match device_name {
            None => ports.into_iter().next().ok_or(PlayerError::NoOutputPort)?,
            Some(wanted) => ports
                .into_iter()
                .find(|port| {
                    midi_out
                        .port_name(port)
                        .map(|name| name == wanted)
                        .unwrap_or(false)
                })
                .ok_or_else(|| PlayerError::PortNotFound(wanted.to_string()))?,
        };

        Ok((midi_out, port))
    }
}

impl Default for MidiDeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

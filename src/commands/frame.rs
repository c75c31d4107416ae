//! Single-frame decode/encode handlers.

use anyhow::{anyhow, Result};
use irkey_protocol::protocol::keyboard::header;
use irkey_protocol::{
    hid, joystick, keyboard, DecodedFrame, FrameValidator, JoystickPayload, KeyEvent,
    KeyboardPayload, RawFrame,
};

use crate::cli::{parse_u8, EncodeEvent};
use irkey_c64::Config;

/// Decode one frame and print the payload and event
pub fn decode(config: &Config, pulses: &[String]) -> Result<()> {
    let frame: RawFrame = pulses.join(" ").parse()?;
    let validator = FrameValidator::new(config.timing());

    println!("Frame: {} pulses", frame.len());
    let decoded = validator.decode_frame(&frame)?;
    match decoded {
        DecodedFrame::Keyboard(payload) => {
            println!("Protocol: keyboard");
            println!("Payload:  {payload}");
        }
        DecodedFrame::Joystick(payload) => {
            println!("Protocol: joystick");
            println!("Payload:  {payload}");
        }
    }

    let event = validator.validate(decoded)?;
    println!("Event:    {event}");
    if let KeyEvent::Key { code, .. } = event {
        println!("Key:      {}", hid::key_name(code));
    }
    // Joystick-protocol axes do not fit the packed word
    if matches!(decoded, DecodedFrame::Keyboard(_)) {
        println!("Word:     0x{:08X}", event.to_word());
    }
    Ok(())
}

/// Print the nominal pulse train for an event
pub fn encode(event: EncodeEvent) -> Result<()> {
    let frame = match event {
        EncodeEvent::Key {
            key,
            release,
            repeat,
            modifier,
        } => {
            let code = hid::key_code_from_name(&key)
                .or_else(|| parse_u8(&key).ok())
                .ok_or_else(|| anyhow!("unknown key: {key}"))?;
            let mut hdr = header::KEY;
            if release {
                hdr |= header::RELEASE;
            }
            if repeat {
                hdr |= header::REPEAT;
            }
            keyboard::encode(KeyboardPayload::key(hdr, modifier, code))
        }
        EncodeEvent::Joystick {
            x,
            y,
            button1,
            button2,
        } => joystick::encode(JoystickPayload::new(x, y, button1, button2)),
    };
    println!("{frame}");
    Ok(())
}

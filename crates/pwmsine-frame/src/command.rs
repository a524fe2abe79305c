//! Command identifiers.
//!
//! Byte 0 of every frame in both directions. A response echoes the id of the
//! request it answers.

pub const START: u8 = 0;
pub const STOP: u8 = 1;
pub const SET_SINE_PARAM: u8 = 2;
pub const SET_MAX_CYCLE: u8 = 3;
pub const GET_STATUS: u8 = 4;
pub const GET_SINE_PARAM: u8 = 5;
pub const GET_MAX_CYCLE: u8 = 6;
/// Calibration read: full-scale duty-cycle count.
pub const GET_TOP: u8 = 7;
/// Reboot into firmware-update mode. The device never answers.
pub const DFU_MODE: u8 = 8;
pub const DC_MODE_ON: u8 = 9;
pub const DC_MODE_OFF: u8 = 10;
pub const SET_DC_VAL: u8 = 11;
pub const GET_DC_MODE: u8 = 12;
pub const GET_DC_VAL: u8 = 13;
/// Raw diagnostic counters.
pub const DEBUG: u8 = 254;
/// No-op used once to prime the endpoints after open.
pub const DUMMY: u8 = 255;

/// Returns a human-readable name for a command id.
pub fn command_name(id: u8) -> &'static str {
    match id {
        START => "START",
        STOP => "STOP",
        SET_SINE_PARAM => "SET_SINE_PARAM",
        SET_MAX_CYCLE => "SET_MAX_CYCLE",
        GET_STATUS => "GET_STATUS",
        GET_SINE_PARAM => "GET_SINE_PARAM",
        GET_MAX_CYCLE => "GET_MAX_CYCLE",
        GET_TOP => "GET_TOP",
        DFU_MODE => "DFU_MODE",
        DC_MODE_ON => "DC_MODE_ON",
        DC_MODE_OFF => "DC_MODE_OFF",
        SET_DC_VAL => "SET_DC_VAL",
        GET_DC_MODE => "GET_DC_MODE",
        GET_DC_VAL => "GET_DC_VAL",
        DEBUG => "DEBUG",
        DUMMY => "DUMMY",
        _ => "UNKNOWN",
    }
}

/// Returns true if the device replies to this command.
pub fn expects_response(id: u8) -> bool {
    id != DFU_MODE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_cover_known_ids() {
        assert_eq!(command_name(GET_TOP), "GET_TOP");
        assert_eq!(command_name(DUMMY), "DUMMY");
        assert_eq!(command_name(100), "UNKNOWN");
    }

    #[test]
    fn only_dfu_is_fire_and_forget() {
        assert!(!expects_response(DFU_MODE));
        assert!(expects_response(START));
        assert!(expects_response(DUMMY));
    }
}

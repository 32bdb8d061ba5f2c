// Names for radio streams that the API reports without a station name.
//
// BBC streams started through a voice assistant only carry the playlist file
// name, e.g. "bbc_radio_two.m3u8".

use std::collections::HashMap;
use lazy_static::lazy_static;

/// Label used when a stream is not in the table
pub const GENERIC_RADIO_LABEL: &str = "Radio";

lazy_static! {
    static ref KNOWN_STATIONS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("bbc_radio_one.m3u8", "BBC Radio 1");
        m.insert("bbc_1xtra.m3u8", "BBC Radio 1Xtra");
        m.insert("bbc_radio_two.m3u8", "BBC Radio 2");
        m.insert("bbc_radio_three.m3u8", "BBC Radio 3");
        m.insert("bbc_radio_fourfm.m3u8", "BBC Radio 4");
        m.insert("bbc_radio_five_live.m3u8", "BBC Radio 5 Live");
        m.insert("bbc_radio_five_live_sports_extra.m3u8", "BBC Radio 5 Live Sports Extra");
        m.insert("bbc_6music.m3u8", "BBC Radio 6 Music");
        m.insert("bbc_world_service.m3u8", "BBC World Service");
        m.insert("bbc_radio_hereford_worcester.m3u8", "BBC Hereford & Worcester");
        m
    };
}

/// Resolve a display name for a stream identifier. Exact, case-sensitive match.
pub fn station_name(stream_id: &str) -> &'static str {
    KNOWN_STATIONS
        .get(stream_id)
        .copied()
        .unwrap_or(GENERIC_RADIO_LABEL)
}

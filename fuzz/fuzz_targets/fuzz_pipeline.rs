#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use zl_layout::{LayoutOptions, Measurements, compute_connectors, compute_order};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let Some(today) = NaiveDate::from_ymd_opt(2025, 6, 15) else {
        return;
    };

    let document = zl_parser::parse(raw);

    for lane_mode in [false, true] {
        let options = LayoutOptions {
            lane_mode,
            ..LayoutOptions::default()
        };
        let layout = compute_order(&document.events, &options, today);

        assert!(layout.today_insert_index <= layout.order.len());
        for pair in layout.order.windows(2) {
            assert!(pair[0].date <= pair[1].date);
        }

        let measurements = Measurements {
            offsets: (0..layout.order.len()).map(|i| i as f32 * 64.0).collect(),
            content_bottom: layout.order.len() as f32 * 64.0,
        };
        let _ = compute_connectors(&layout, &measurements, &options);
    }
});

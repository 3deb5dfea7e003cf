#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    let document = zl_parser::parse(raw);

    // Source spans are strictly increasing, disjoint, and in bounds, and
    // the reverse lookup maps each span back to its own event.
    let mut previous_end = 0usize;
    for (index, event) in document.events.iter().enumerate() {
        assert!(event.source_start < event.source_end);
        assert!(previous_end <= event.source_start);
        assert!(event.source_end <= raw.len());
        assert_eq!(document.event_at_offset(event.source_start), Some(index));
        previous_end = event.source_end;
    }
});

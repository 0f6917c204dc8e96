#![no_main]

use libfuzzer_sys::fuzz_target;
use restructure::analysis::{analyze, Cfg, Strategy};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(cfg) = Cfg::from_dot(text) else {
        return;
    };

    let reparsed = Cfg::from_dot(&cfg.to_dot()).expect("written DOT must parse");
    assert_eq!(reparsed, cfg);

    for strategy in [Strategy::Hammock, Strategy::Interval] {
        let mut cfg = cfg.clone();
        let _ = analyze(&mut cfg, strategy);
    }
});

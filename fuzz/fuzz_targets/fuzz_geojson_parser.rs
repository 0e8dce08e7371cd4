#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(contents) = std::str::from_utf8(data) else {
        return;
    };

    // Parser darf nie paniken; gültige Dokumente müssen sich neu schreiben lassen
    if let Ok(parsed) = input_layers::read_features(contents) {
        let layer_id = input_layers::LayerId::generate();
        let features: Vec<_> = parsed
            .into_iter()
            .map(|feature| feature.into_feature(layer_id))
            .collect();
        let written = input_layers::write_features(&features).expect("write_features");
        let reparsed = input_layers::read_features(&written).expect("reparse");
        assert_eq!(reparsed.len(), features.len());
    }
    let _ = input_layers::read_feature(contents);
});

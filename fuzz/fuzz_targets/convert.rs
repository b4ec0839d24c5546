// cargo fuzz run convert corpus/convert -- -timeout=30

#![no_main]

use std::io::{self, Cursor};
use libfuzzer_sys::fuzz_target;

use gif2bmp::Converter;

fuzz_target!(|data: &[u8]| {
    let _ = Converter::new()
        .max_image_sz(Some(1 << 20))
        .convert(Cursor::new(data), io::sink());
});

#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw_data: &[u8]| {
    let _ = lzwdec::decode::Decoder::new().decode(raw_data);
    let _ = lzwdec::decode_lzw(raw_data);
});

#![no_main]
use libfuzzer_sys::fuzz_target;
use pgsolve_games::io::parse_game;

fuzz_target!(|data: &[u8]| {
    let _ = parse_game(data);
});

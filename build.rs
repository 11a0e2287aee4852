fn main() {
    // Process the LALRPOP grammar for the native directive syntax
    lalrpop::process_root().unwrap();
}

fn main() {
    quip_cli::run_main();
}

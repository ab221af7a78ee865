fn main() -> std::process::ExitCode {
    natureid_lib::run()
}

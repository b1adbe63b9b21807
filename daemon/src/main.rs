use splashd::daemon;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    smol::block_on(daemon::start())
}

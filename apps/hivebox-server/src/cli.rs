use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "hivebox-server",
    version,
    about = "Average ambient temperature across configured senseBoxes"
)]
pub struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, default_value_t = 8000)]
    pub port: u16,
}

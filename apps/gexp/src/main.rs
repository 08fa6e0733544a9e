use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = gexp::Args::parse();
	gexp::run(args).await
}

use clap::Args;
use logtree::Severity;

#[derive(Args, Debug)]
pub struct Cmd {}

impl Cmd {
    pub fn run(&self) -> eyre::Result<()> {
        for (rank, severity) in Severity::ALL.iter().enumerate() {
            println!("{}  {}", rank, severity);
        }
        Ok(())
    }
}

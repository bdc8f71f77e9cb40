use treekit::{cli, logging, runner};

fn main() -> anyhow::Result<()> {
    logging::init();
    let app = cli::parse();
    runner::run(app)
}

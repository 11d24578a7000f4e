use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version)]
#[clap(name = "Optima Distributed Self Learning Client")]
#[clap(about = "Coordinates, plays and trains self-play MCTS networks", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Coordinator(CoordinatorCommand),
    Worker(WorkerCommand),
    SelfLearn(SelfLearnCommand),
    Train(TrainCommand),
}

#[derive(Args)]
#[clap(about = "Serves weights to workers, aggregates their triplets and trains", long_about = None)]
pub struct CoordinatorCommand {
    #[clap(short, long, default_value_t = String::from("client.conf"))]
    pub config: String,
}

#[derive(Args)]
#[clap(about = "Pulls weights, plays self-play games and reports them to a coordinator", long_about = None)]
pub struct WorkerCommand {
    #[clap(short, long, default_value_t = String::from("client.conf"))]
    pub config: String,

    #[clap(long)]
    pub coordinator_url: Option<String>,

    /// Minutes to run for. Runs until stopped when omitted.
    #[clap(short, long)]
    pub duration: Option<u64>,
}

#[derive(Args)]
#[clap(about = "Plays and trains in a single process", long_about = None)]
pub struct SelfLearnCommand {
    #[clap(short, long, default_value_t = String::from("client.conf"))]
    pub config: String,
}

#[derive(Args)]
#[clap(about = "Trains on the coordinator's aggregate triplets file", long_about = None)]
pub struct TrainCommand {
    #[clap(short, long, default_value_t = String::from("client.conf"))]
    pub config: String,

    #[clap(short, long)]
    pub epochs: Option<usize>,
}

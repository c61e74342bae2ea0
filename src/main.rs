//main.rs
use clap::Parser;
use census_kmeans::{ClusterEngine, DataSet, KMeansConfig, RngSource, DEFAULT_MAX_ITERATIONS};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[clap(version = "0.2.0", author = "Stefan L. <stefan.lang@med.lu.se>")]
struct Opts {
    /// Census table (postCode, inhabitants, maleInhabitants, femaleInhabitants)
    #[clap(short, long)]
    file: String,

    #[clap(short, long)]
    k: usize,

    /// Output TSV of postCode and cluster index
    #[clap(short, long)]
    outfile: String,

    #[clap(short, long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Seed for centroid initialization; random when omitted
    #[clap(short, long)]
    seed: Option<u64>,

    /// Stop as soon as no point changes cluster
    #[clap(long)]
    stop_when_stable: bool,

    #[clap(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logging(opts.verbose)?;

    let ds = DataSet::from_path(&opts.file)?;
    info!("Loaded {} postcodes from {}", ds.len(), opts.file);

    let engine = ClusterEngine::new(
        KMeansConfig::new(opts.k)
            .with_max_iterations(opts.max_iterations)
            .with_stop_when_stable(opts.stop_when_stable),
    );

    let run = match opts.seed {
        Some(seed) => engine.run(ds.points(), &mut RngSource::seeded(seed))?,
        None => engine.run(ds.points(), &mut RngSource::thread())?,
    };

    for (ci, cluster) in run.clusters().iter().enumerate() {
        info!("Cluster {}: {} postcodes", ci, cluster.len());
    }
    info!("Within-cluster sum of squares: {:.4}", run.within_cluster_ss());

    let mut lines = vec!["postCode\tcluster".to_string()];
    lines.extend(
        ds.points()
            .iter()
            .zip(run.assignments())
            .map(|(p, c)| format!("{}\t{}", p.id(), c)),
    );
    std::fs::write(&opts.outfile, lines.join("\n"))?;

    Ok(())
}

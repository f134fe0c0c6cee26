use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;

use coreos_ami::helpers::{KNOWN_CHANNELS, choose_one, region_options, type_options};
use coreos_ami::resource::{Plan, plan, schema};
use coreos_ami::{
    AmiResolver, AmiResource, FeedConfig, HttpManifestSource, ManifestSource, Resource, ResourceData, Selector, StateStore,
};

const FEED_ENV: &str = "COREOS_AMI_FEED";

#[derive(Debug, Parser)]
#[clap(name = "coreos-ami", about = "Resolve CoreOS AMI ids from the release manifests")]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// JSON feed config (url template and user agent)
    #[clap(long, global = true)]
    feed: Option<PathBuf>,

    /// Where the resource record is kept between runs
    #[clap(long, global = true, default_value = "coreos-ami.state.json")]
    state: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the AMI id for a selector
    Resolve(SelectorArgs),
    /// Resolve and store the resource, replacing a stored one with other inputs
    Create(SelectorArgs),
    /// Re-resolve the stored resource
    Read,
    /// Check the stored identity against the stored inputs
    Exists,
    /// Forget the stored resource
    Delete,
    /// Choose channel, region and type interactively
    Pick,
    /// Print the resource schema as JSON
    Schema,
}

#[derive(Debug, Args)]
struct SelectorArgs {
    #[clap(long, default_value = "stable")]
    channel: String,
    #[clap(long, default_value = "us-west-2")]
    region: String,
    /// Virtualization type: pv or hvm
    #[clap(long = "type", default_value = "pv")]
    virtualization_type: String,
}

impl SelectorArgs {
    fn data(&self) -> ResourceData {
        ResourceData::new(self.channel.as_str(), self.region.as_str(), self.virtualization_type.as_str())
    }
}

fn load_feed_config(path: Option<&PathBuf>) -> Result<FeedConfig> {
    if let Some(path) = path {
        return FeedConfig::from_file(path).with_context(|| format!("load feed config {}", path.display()));
    }
    if std::env::var_os(FEED_ENV).is_some() {
        return FeedConfig::from_env(FEED_ENV).with_context(|| format!("load feed config from ${FEED_ENV}"));
    }
    Ok(FeedConfig::default())
}

/// A tiny wrapper to render the final selection cleanly
fn print_selection(data: &ResourceData) {
    println!("\n=== Selection ===");
    println!("Channel:  {}", data.channel());
    println!("Region:   {}", data.region());
    println!("Type:     {}", data.virtualization_type());
    println!("AMI:      {}", data.ami().unwrap_or("<none>"));
    println!("ID:       {}", data.id().unwrap_or("<none>"));
}

async fn pick<S: ManifestSource>(resource: &AmiResource<S>) -> Result<ResourceData> {
    let channel = choose_one("Select Channel", KNOWN_CHANNELS.to_vec())?;

    let manifest = resource
        .resolver()
        .source()
        .fetch(&channel)
        .await
        .with_context(|| format!("fetch manifest for channel '{channel}'"))?;
    let regions = region_options(&manifest);
    if regions.is_empty() {
        bail!("Manifest for channel '{channel}' lists no regions");
    }

    let region = choose_one("Select Region", regions)?;
    let virtualization_type = choose_one("Select Virtualization Type", type_options())?;

    let mut data = ResourceData::new(channel, region, virtualization_type);
    resource.create(&mut data).await?;
    Ok(data)
}

async fn create<S: ManifestSource>(resource: &AmiResource<S>, store: &StateStore, desired: ResourceData) -> Result<()> {
    let stored = store.load()?.map(ResourceData::from);

    match plan(stored.as_ref(), &desired) {
        Plan::Keep => {
            info!("inputs unchanged, refreshing instead");
        }
        Plan::Replace => {
            if let Some(mut old) = stored {
                warn!("inputs changed, replacing {}", old.id().unwrap_or_default());
                resource.delete(&mut old)?;
                store.clear()?;
            }
        }
        Plan::Create => {}
    }

    let mut data = desired;
    resource.create(&mut data).await?;
    if let Some(record) = data.to_resolved() {
        store.save(&record)?;
    }
    print_selection(&data);
    Ok(())
}

fn load_present(store: &StateStore) -> Result<ResourceData> {
    match store.load()? {
        Some(record) => Ok(record.into()),
        None => bail!("no resource stored in {}", store.path().display()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let store = StateStore::new(&cli.state);

    let config = load_feed_config(cli.feed.as_ref())?;
    let resource = AmiResource::new(AmiResolver::new(HttpManifestSource::new(config)?));

    match cli.command {
        Command::Resolve(args) => {
            let selector = Selector::new(args.channel.as_str(), args.region.as_str(), &args.virtualization_type)?;
            let ami = resource.resolver().resolve(&selector).await?;
            println!("{ami}");
        }
        Command::Create(args) => create(&resource, &store, args.data()).await?,
        Command::Read => {
            let mut data = load_present(&store)?;
            resource
                .read(&mut data)
                .await
                .with_context(|| format!("refresh {}", data.id().unwrap_or_default()))?;
            if let Some(record) = data.to_resolved() {
                store.save(&record)?;
            }
            print_selection(&data);
        }
        Command::Exists => {
            let exists = match store.load()? {
                Some(record) => resource.exists(&record.into())?,
                None => false,
            };
            println!("{exists}");
        }
        Command::Delete => {
            if let Some(record) = store.load()? {
                let mut data = ResourceData::from(record);
                resource.delete(&mut data)?;
            }
            store.clear()?;
        }
        Command::Pick => {
            let data = pick(&resource).await?;
            print_selection(&data);
        }
        Command::Schema => println!("{}", serde_json::to_string_pretty(schema())?),
    }

    Ok(())
}

use {
    crate::identity::entities::BidCreationCheck,
    anyhow::Result,
    clap::{
        crate_authors,
        crate_description,
        crate_name,
        crate_version,
        Args,
        Parser,
    },
    serde::Deserialize,
    std::{
        fs,
        time::Duration,
    },
};

mod server;

// `Options` is the command line of the server, parsed with clap.
#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
#[allow(clippy::large_enum_variant)]
pub enum Options {
    /// Run the procurement server service.
    Run(RunOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Server Options
    #[command(flatten)]
    pub server: server::Options,

    #[command(flatten)]
    pub config: ConfigOptions,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Config Options")]
#[group(id = "Config")]
pub struct ConfigOptions {
    /// Path to a configuration file with the service settings.
    #[arg(long = "config")]
    #[arg(env = "PROCUREMENT_CONFIG")]
    #[arg(default_value = "config.yaml")]
    pub config: String,
}

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_QUORUM_CAP: i64 = 3;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Upper bound of the time a request may spend on the store.
    #[serde(with = "humantime_serde")]
    pub request_timeout:    Duration,
    pub decision:           DecisionConfig,
    /// How the bid author's link to the bid organization is checked.
    pub bid_creation_check: BidCreationCheck,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout:    DEFAULT_REQUEST_TIMEOUT,
            decision:           DecisionConfig::default(),
            bid_creation_check: BidCreationCheck::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecisionConfig {
    /// A bid is accepted after this many approvals, or after every responsible of its
    /// organization approved it when there are fewer of them.
    pub quorum_cap: i64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            quorum_cap: DEFAULT_QUORUM_CAP,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        let yaml_content = fs::read_to_string(path)?;
        Self::parse(&yaml_content)
    }

    fn parse(yaml_content: &str) -> Result<Config> {
        // An empty file holds no document, which serde_yaml reads as unit.
        if yaml_content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(yaml_content)?;
        anyhow::ensure!(
            config.decision.quorum_cap > 0,
            "decision.quorum_cap must be positive"
        );
        Ok(config)
    }
}

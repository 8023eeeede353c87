//! Command-line interface for x-radar
//!
//! Parses arguments with clap and dispatches to the query operations. Argument
//! errors are turned into `RadarError::Validation` so they are reported in the
//! same JSON envelope as every other failure.

use std::ffi::OsString;

use chrono::{DateTime, Utc};
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};

use crate::api::Transport;
use crate::cache::CacheStore;
use crate::data::{FilterSpec, SortKey};
use crate::envelope::Envelope;
use crate::error::RadarError;
use crate::ops::{Radar, SearchParams, UserTweetsParams};

/// x-radar - scout X posts from the command line (read-only)
///
/// Requires X_BEARER_TOKEN for live requests. Responses are cached on disk
/// (override the location with X_RADAR_CACHE_DIR).
#[derive(Parser, Debug)]
#[command(name = "x-radar")]
#[command(about = "Read-only X scouting: search, rank, and estimate cost")]
#[command(version)]
pub struct Cli {
    /// Log more to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Search recent posts
    Search(SearchArgs),
    /// Fetch a single tweet by id
    Tweet(TweetArgs),
    /// Get recent original posts from a username
    UserTweets(UserTweetsArgs),
}

/// Engagement thresholds shared by the ranked commands
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterArgs {
    /// Drop posts with fewer likes
    #[arg(long, default_value_t = 0)]
    pub min_likes: u64,
    /// Drop posts with fewer replies
    #[arg(long, default_value_t = 0)]
    pub min_replies: u64,
    /// Drop posts with fewer retweets
    #[arg(long, default_value_t = 0)]
    pub min_retweets: u64,
}

impl From<FilterArgs> for FilterSpec {
    fn from(args: FilterArgs) -> Self {
        FilterSpec {
            min_likes: args.min_likes,
            min_replies: args.min_replies,
            min_retweets: args.min_retweets,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SearchArgs {
    /// Search query (X API v2 query syntax)
    #[arg(long)]
    pub query: String,
    /// Maximum posts to return
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: u64,
    /// Ranking order
    #[arg(long, value_enum, default_value_t = SortKey::Likes)]
    pub sort: SortKey,
    /// Time window like 1h, 3h, 12h, 1d, 7d
    #[arg(long)]
    pub since: Option<String>,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Cheap pulse check (defaults: since=24h, -is:reply, -is:retweet, max_results=10)
    #[arg(long)]
    pub quick: bool,
    /// Ignore and don't write the response cache
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct TweetArgs {
    /// Tweet id
    #[arg(long)]
    pub id: String,
    /// Ignore and don't write the response cache
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct UserTweetsArgs {
    /// Username, with or without a leading @
    #[arg(long)]
    pub username: String,
    /// Maximum posts to return
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: u64,
    /// Ranking order
    #[arg(long, value_enum, default_value_t = SortKey::Recent)]
    pub sort: SortKey,
    /// Time window like 1h, 3h, 12h, 1d, 7d
    #[arg(long)]
    pub since: Option<String>,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Ignore and don't write the response cache
    #[arg(long)]
    pub no_cache: bool,
}

fn to_limit(limit: u64) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

impl From<SearchArgs> for SearchParams {
    fn from(args: SearchArgs) -> Self {
        SearchParams {
            query: args.query,
            limit: to_limit(args.limit),
            sort: args.sort,
            since: args.since,
            filters: args.filters.into(),
            quick: args.quick,
            no_cache: args.no_cache,
        }
    }
}

impl From<UserTweetsArgs> for UserTweetsParams {
    fn from(args: UserTweetsArgs) -> Self {
        UserTweetsParams {
            username: args.username,
            limit: to_limit(args.limit),
            sort: args.sort,
            since: args.since,
            filters: args.filters.into(),
            no_cache: args.no_cache,
        }
    }
}

/// Outcome of argument parsing
#[derive(Debug)]
pub enum Invocation {
    /// Arguments are valid; run the command
    Run(Cli),
    /// `--help` or `--version`; print it and exit successfully
    Display(clap::Error),
    /// Malformed arguments
    Invalid(RadarError),
}

/// Parses arguments without exiting the process
pub fn parse_invocation<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Invocation::Run(cli),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Invocation::Display(err)
        }
        Err(err) if err.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            Invocation::Invalid(RadarError::Validation(
                "a subcommand is required: search, tweet, or user-tweets".to_string(),
            ))
        }
        Err(err) => Invocation::Invalid(RadarError::Validation(usage_message(&err))),
    }
}

/// clap's rendered error on one line, without the `error: ` prefix or usage trailer
fn usage_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let message = rendered
        .lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with("Usage:") && !line.starts_with("For more information"))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let message = message.strip_prefix("error: ").unwrap_or(&message);
    if message.is_empty() {
        "invalid arguments".to_string()
    } else {
        message.to_string()
    }
}

impl Command {
    /// Runs the command against `radar`
    pub async fn execute<C: CacheStore, T: Transport>(
        self,
        radar: &Radar<C, T>,
        now: DateTime<Utc>,
    ) -> Result<Envelope, RadarError> {
        match self {
            Command::Search(args) => radar.search(args.into(), now).await,
            Command::Tweet(args) => radar.tweet(&args.id, args.no_cache).await,
            Command::UserTweets(args) => radar.user_tweets(args.into(), now).await,
        }
    }
}

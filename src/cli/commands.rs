use crate::cli::args::{Cli, Commands};
use crate::error::{ExtractError, Result};
use crate::models::{parse_variables, AcsDataset, ExtractRequest, FipsLookup};
use crate::processors::ExtractPipeline;
use crate::readers::FipsReader;
use crate::settings::Settings;
use crate::sources::CensusApiClient;
use crate::utils::constants::EXAMPLE_COUNTY_COUNT;
use crate::utils::prompt::Prompter;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Values given on the command line; anything missing is prompted for.
#[derive(Debug, Default)]
pub struct ExtractInputs {
    pub state: Option<String>,
    pub county: Option<String>,
    pub year: Option<u16>,
    pub variables: Vec<String>,
    pub output_dir: Option<PathBuf>,
}

/// Logs go to stderr so prompts and summaries on stdout stay readable.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "settings loaded");

    let lookup_path = cli.lookup.unwrap_or_else(|| settings.lookup_path.clone());
    let lookup = FipsReader::with_encoding(&settings.lookup_encoding)?.read_lookup(&lookup_path)?;

    match cli.command {
        Commands::Extract {
            state,
            county,
            year,
            variables,
            output_dir,
            dataset,
            strict,
            zip,
            keep_geojson,
            quiet,
        } => {
            let dataset = match dataset {
                Some(name) => name.parse::<AcsDataset>()?,
                None => settings.default_dataset,
            };
            let inputs = ExtractInputs {
                state,
                county,
                year,
                variables,
                output_dir,
            };

            let stdin = std::io::stdin();
            let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
            let request = collect_request(&mut prompter, &lookup, inputs, dataset)?
                .with_strict(strict)
                .with_zip(zip);
            request.check()?;

            info!(
                state = %request.state_abbr,
                county = %request.county_name,
                year = request.year,
                dataset = %request.dataset,
                "starting extraction"
            );

            let source = CensusApiClient::new(&settings)?;
            let pipeline = ExtractPipeline::new(&lookup, source)
                .with_silent(quiet)
                .with_keep_geojson(keep_geojson);
            let summary = pipeline.run(&request).await?;

            println!("\n{}", summary.summary());
            println!("Process finished");
        }

        Commands::Lookup { state, county } => {
            let codes = lookup.resolve(&state, &county)?;
            println!(
                "{} {}: {} (GEOID {})",
                state.trim().to_uppercase(),
                county.trim(),
                codes,
                codes.geoid()
            );
        }

        Commands::Counties { state, limit } => {
            if !lookup.has_state(&state) {
                return Err(unknown_state(&state));
            }
            let counties = lookup.counties_for_state(&state);

            let shown = limit.unwrap_or(counties.len()).min(counties.len());
            for county in counties.iter().take(shown) {
                println!("{}", county);
            }
            if shown < counties.len() {
                println!("... {} more", counties.len() - shown);
            }
        }
    }

    Ok(())
}

/// Build the request from flags, asking for whatever is missing.
pub fn collect_request<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    lookup: &FipsLookup,
    inputs: ExtractInputs,
    dataset: AcsDataset,
) -> Result<ExtractRequest> {
    let interactive = inputs.state.is_none()
        || inputs.county.is_none()
        || inputs.year.is_none()
        || inputs.variables.is_empty()
        || inputs.output_dir.is_none();
    if interactive {
        prompter.say("Welcome to the county level Census GIS extractor for ACS data")?;
    }

    let state = match inputs.state {
        Some(state) => state,
        None => prompter.ask_required(
            "What state would you like to pull data for?",
            "Examples: CA, NY, CT",
        )?,
    };

    let county = match inputs.county {
        Some(county) => county,
        None => {
            if !lookup.has_state(&state) {
                return Err(unknown_state(&state));
            }
            let examples = lookup.example_counties(&state, EXAMPLE_COUNTY_COUNT);
            prompter.ask_required(
                "What county would you like to pull data for?",
                &format!("Examples: {}", examples.join(", ")),
            )?
        }
    };

    let year = match inputs.year {
        Some(year) => year,
        None => {
            let answer = prompter.ask_required(
                "What year's data are you interested in?",
                "Examples: 2015, 2016, 2017, 2018",
            )?;
            answer.parse::<u16>().map_err(|_| {
                ExtractError::InvalidInput(format!("Year must be a number, got '{}'", answer))
            })?
        }
    };

    let variables = if inputs.variables.is_empty() {
        prompter.say(&format!(
            "For a list of variables visit {}",
            dataset.variables_url(year)
        ))?;
        prompter.say("Please use the variable NAME, not the LABEL")?;
        let answer = prompter.ask_required(
            "What variables would you like to pull?",
            "Type a list of variables separated by spaces",
        )?;
        parse_variables(&answer)
    } else {
        parse_variables(&inputs.variables.join(" "))
    };

    let output_dir = match inputs.output_dir {
        Some(dir) => dir,
        None => PathBuf::from(prompter.ask_required(
            "Where would you like to save the shapefile to?",
            "Example: ./output",
        )?),
    };

    Ok(ExtractRequest::new(&state, &county, year, variables, output_dir).with_dataset(dataset))
}

fn unknown_state(state: &str) -> ExtractError {
    ExtractError::InvalidInput(format!(
        "State '{}' is not in the FIPS lookup table",
        state.trim()
    ))
}

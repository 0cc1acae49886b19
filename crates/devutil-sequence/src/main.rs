use devutil_sequence::*;
use tracing_subscriber::EnvFilter;

/// The amount of values to draw if not specified.
const DEFAULT_COUNT: u64 = 10;

/// Get the value of process environment variable `key`, if it is set.
///
/// Returns an error if the value is an invalid unicode.
fn optional_env_var(key: &'static str) -> Result<Option<String>, anyhow::Error> {
    let Some(raw) = std::env::var_os(key) else {
        return Ok(None);
    };
    let string = raw
        .into_string()
        .map_err(|_| anyhow::format_err!("{} env var is not a valid unicode string", key))?;
    Ok(Some(string))
}

/// Get the value of process environment variable `key` and parse it into the type `T`,
/// if it is set.
fn parse_env_var<T>(key: &'static str) -> Result<Option<T>, anyhow::Error>
where
    T: std::str::FromStr,
    <T as std::str::FromStr>::Err: std::fmt::Display,
{
    optional_env_var(key)?
        .map(|string| {
            string
                .parse()
                .map_err(|err| anyhow::format_err!("{} env var is not valid: {}", key, err))
        })
        .transpose()
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let params: Params = match optional_env_var("SEQUENCE_PARAMS")? {
        Some(json) => serde_json::from_str(&json)
            .map_err(|err| anyhow::format_err!("SEQUENCE_PARAMS env var is not valid: {}", err))?,
        None => Params::default(),
    };
    let state = optional_env_var("SEQUENCE_STATE")?.map(String::into_bytes);
    let load_mode = match optional_env_var("SEQUENCE_STRICT")?.as_deref() {
        Some("1" | "true") => LoadMode::Validated,
        _ => LoadMode::Trusted,
    };
    let count = parse_env_var("SEQUENCE_COUNT")?.unwrap_or(DEFAULT_COUNT);

    let output = make(Input {
        params,
        state,
        load_mode,
        count,
    })?;

    for value in &output.values {
        println!("{}", value);
    }
    println!("\n{}", output.description);
    if let Some(state) = output.state {
        println!("{}", String::from_utf8_lossy(&state));
    }

    Ok(())
}

use tagseek::TagSeekError;

#[derive(Debug)]
pub enum CliError {
    Config { source: String },
    ParseError { msg: String },
    Io { source: String, path: Option<String> },
    Search { source: String },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config { source } => write!(f, "Error interpreting the config: {}", source),
            CliError::ParseError { msg } => write!(f, "Error parsing input: {}", msg),
            CliError::Io { source, path } => {
                if let Some(path) = path {
                    write!(f, "Error reading file {}: {}", path, source)
                } else {
                    write!(f, "Error reading file: {}", source)
                }
            }
            CliError::Search { source } => write!(f, "Error setting up the search: {}", source),
        }
    }
}

impl From<TagSeekError> for CliError {
    fn from(e: TagSeekError) -> Self {
        match e {
            TagSeekError::Config(e) => CliError::Config {
                source: e.to_string(),
            },
            TagSeekError::ParseError { msg } => CliError::ParseError { msg },
            TagSeekError::Io { source, path } => CliError::Io {
                source: source.to_string(),
                path: path.map(|p| p.to_string_lossy().to_string()),
            },
            other => CliError::Search {
                source: format!("{:?}", other),
            },
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::ParseError { msg: e.to_string() }
    }
}

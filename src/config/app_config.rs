use crate::adapters::http::{ApiSettings, AuthScheme, Credentials};
use crate::core::composer::{Template, PLACEHOLDER};
use crate::core::scheduler::{DeliveryPlan, PushMode, SchedulePlan, UNLIMITED};
use crate::core::{DataSource, FileEntry, RequestMethod};
use crate::utils::error::{PushError, Result};
use crate::utils::validation::{
    validate_data_path, validate_delimiter, validate_endpoint, validate_min,
    validate_non_empty_string, validate_required_field, Validate,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_DELIMITER: u8 = b',';

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub data_files: Option<DataFilesConfig>,
    pub csv_delimiter: Option<String>,
    pub schedule: Option<ScheduleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: Option<String>,
    pub request_method: Option<String>,
    pub auth: Option<AuthConfig>,
    pub headers: Option<BTreeMap<String, String>>,
    pub timeout_seconds: Option<u64>,
    pub payload: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub user: String,
    pub pass: String,
    pub scheme: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFilesConfig {
    pub files: Option<Vec<FileEntry>>,
    pub folder: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(alias = "limitation")]
    pub period: Option<i64>,
    pub duration: Option<f64>,
    pub push_by_limitation: Option<bool>,
    pub data_files: Option<Vec<FileEntry>>,
}

/// Everything a run needs, checked and typed.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api: ApiSettings,
    pub delimiter: u8,
    pub plan: DeliveryPlan,
}

impl AppConfig {
    /// `.toml` files are read as TOML, anything else as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PushError::FileAccessError {
            path: path.display().to_string(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        serde_json::from_str(&processed_content).map_err(|e| PushError::ConfigValidationError {
            field: "json_parsing".to_string(),
            message: format!("JSON parsing error: {}", e),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PushError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables and the
    /// payload placeholder are left untouched.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PushError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let whole = &caps[0];
            if whole == PLACEHOLDER {
                return whole.to_string();
            }
            std::env::var(&caps[1]).unwrap_or_else(|_| whole.to_string())
        });

        Ok(result.to_string())
    }

    pub fn request_method(&self) -> Result<RequestMethod> {
        match &self.api.request_method {
            None => Ok(RequestMethod::Post),
            Some(raw) => {
                RequestMethod::parse(raw).ok_or_else(|| PushError::InvalidConfigValueError {
                    field: "api.request_method".to_string(),
                    value: raw.clone(),
                    reason: format!(
                        "Unsupported method. Valid methods: {}",
                        RequestMethod::SUPPORTED.join(", ")
                    ),
                })
            }
        }
    }

    pub fn template(&self) -> Result<Template> {
        match &self.api.payload {
            None => Ok(Template::Placeholder),
            Some(raw) => Template::parse(raw),
        }
    }

    pub fn delimiter(&self) -> Result<u8> {
        match &self.csv_delimiter {
            None => Ok(DEFAULT_DELIMITER),
            Some(raw) => validate_delimiter("csv_delimiter", raw),
        }
    }

    fn auth_scheme(auth: &AuthConfig) -> Result<AuthScheme> {
        match auth.scheme.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
            None => Ok(AuthScheme::Digest),
            Some(s) if s == "digest" => Ok(AuthScheme::Digest),
            Some(s) if s == "basic" => Ok(AuthScheme::Basic),
            Some(other) => Err(PushError::InvalidConfigValueError {
                field: "api.auth.scheme".to_string(),
                value: other,
                reason: "Valid schemes: digest, basic".to_string(),
            }),
        }
    }

    fn validate_entries(field_name: &str, entries: &[FileEntry]) -> Result<()> {
        for entry in entries {
            if let FileEntry::Group(paths) = entry {
                if paths.is_empty() {
                    return Err(PushError::ConfigValidationError {
                        field: field_name.to_string(),
                        message: "File groups cannot be empty".to_string(),
                    });
                }
            }
            for path in entry.paths() {
                validate_data_path(field_name, path)?;
            }
        }
        Ok(())
    }

    fn bootstrap_source(&self) -> Option<DataSource> {
        let data_files = self.data_files.as_ref()?;
        if let Some(folder) = &data_files.folder {
            return Some(DataSource::Folder(folder.clone()));
        }
        data_files.files.clone().map(DataSource::Files)
    }

    /// Seconds between cycles; must be present and fit in a `Duration`.
    fn schedule_delay(schedule: &ScheduleConfig) -> Result<Duration> {
        let seconds = *validate_required_field("schedule.duration", &schedule.duration)?;
        validate_min("schedule.duration", seconds, 0.0)?;
        Duration::try_from_secs_f64(seconds).map_err(|e| PushError::InvalidConfigValueError {
            field: "schedule.duration".to_string(),
            value: seconds.to_string(),
            reason: format!("Not a usable number of seconds: {}", e),
        })
    }

    pub fn validate_config(&self) -> Result<()> {
        let endpoint = validate_required_field("api.endpoint", &self.api.endpoint)?;
        validate_endpoint("api.endpoint", endpoint)?;

        self.request_method()?;
        self.template()?;
        self.delimiter()?;

        if let Some(auth) = &self.api.auth {
            validate_non_empty_string("api.auth.user", &auth.user)?;
            Self::auth_scheme(auth)?;
        }

        if let Some(headers) = &self.api.headers {
            for name in headers.keys() {
                validate_non_empty_string("api.headers", name)?;
            }
        }

        if let Some(data_files) = &self.data_files {
            if data_files.files.is_some() && data_files.folder.is_some() {
                return Err(PushError::ConfigValidationError {
                    field: "data_files".to_string(),
                    message: "Set either 'files' or 'folder', not both".to_string(),
                });
            }
            if let Some(folder) = &data_files.folder {
                validate_data_path("data_files.folder", folder)?;
            }
            if let Some(files) = &data_files.files {
                Self::validate_entries("data_files.files", files)?;
            }
        }

        if let Some(schedule) = &self.schedule {
            let period = validate_required_field("schedule.period", &schedule.period)?;
            validate_min("schedule.period", *period, UNLIMITED)?;

            Self::schedule_delay(schedule)?;

            if let Some(files) = &schedule.data_files {
                Self::validate_entries("schedule.data_files", files)?;
            }
        }

        Ok(())
    }

    /// Validates and converts into the immutable run settings.
    pub fn into_settings(self) -> Result<Settings> {
        self.validate_config()?;

        let auth = match &self.api.auth {
            Some(auth) => Some(Credentials {
                user: auth.user.clone(),
                pass: auth.pass.clone(),
                scheme: Self::auth_scheme(auth)?,
            }),
            None => None,
        };

        let timeout = match self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS) {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        };

        let api = ApiSettings {
            endpoint: self.api.endpoint.clone().unwrap_or_default(),
            method: self.request_method()?,
            auth,
            headers: self
                .api
                .headers
                .clone()
                .unwrap_or_default()
                .into_iter()
                .collect(),
            timeout,
        };

        let bootstrap = self.bootstrap_source();
        let schedule = match &self.schedule {
            Some(schedule) => {
                let source = match &schedule.data_files {
                    Some(files) => DataSource::Files(files.clone()),
                    None => bootstrap
                        .clone()
                        .unwrap_or_else(|| DataSource::Files(Vec::new())),
                };
                Some(SchedulePlan {
                    budget: schedule.period.unwrap_or(UNLIMITED),
                    delay: Self::schedule_delay(schedule)?,
                    push_mode: if schedule.push_by_limitation.unwrap_or(false) {
                        PushMode::OnePerRound
                    } else {
                        PushMode::AllEachRound
                    },
                    source,
                })
            }
            None => None,
        };

        Ok(Settings {
            api,
            delimiter: self.delimiter()?,
            plan: DeliveryPlan {
                template: self.template()?,
                bootstrap,
                schedule,
            },
        })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

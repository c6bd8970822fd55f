use clap::Parser;
use url::Url;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the SymptoSeek REST backend.
    #[arg(
        long,
        env = "SYMPTOSEEK_API_BASE_URL",
        default_value = "http://localhost:5000"
    )]
    pub api_base_url: Url,

    /// Bearer token for the signed-in session. Leave unset for guest mode.
    #[arg(long, env = "SYMPTOSEEK_TOKEN")]
    pub token: Option<String>,

    /// Stored user id; when set the profile is fetched through the by-id route.
    #[arg(long, env = "SYMPTOSEEK_USER_ID")]
    pub user_id: Option<String>,

    /// Timeout in seconds for each backend request.
    #[arg(long, env = "SYMPTOSEEK_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Fixed latitude to report with each message. Requires --longitude.
    #[arg(long, env = "SYMPTOSEEK_LATITUDE", requires = "longitude")]
    pub latitude: Option<f64>,

    /// Fixed longitude to report with each message. Requires --latitude.
    #[arg(long, env = "SYMPTOSEEK_LONGITUDE", requires = "latitude")]
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_local_backend() {
        let args = Args::try_parse_from(["symptoseek"]).unwrap();

        assert_eq!(args.api_base_url.as_str(), "http://localhost:5000/");
        assert!(args.token.is_none());
        assert!(args.user_id.is_none());
        assert_eq!(args.request_timeout_secs, 30);
        assert!(args.latitude.is_none());
        assert!(args.longitude.is_none());
    }

    #[test]
    fn rejects_an_unparseable_base_url() {
        let result = Args::try_parse_from(["symptoseek", "--api-base-url", "not a url"]);

        assert!(result.is_err());
    }

    #[test]
    fn coordinates_must_come_as_a_pair() {
        let result = Args::try_parse_from(["symptoseek", "--latitude", "23.8103"]);

        assert!(result.is_err());
    }

    #[test]
    fn accepts_a_full_invocation() {
        let args = Args::try_parse_from([
            "symptoseek",
            "--api-base-url",
            "https://api.symptoseek.example",
            "--token",
            "jwt-token",
            "--user-id",
            "665f1c2e9b1d8a0012ab34cd",
            "--latitude",
            "23.8103",
            "--longitude",
            "90.4125",
        ])
        .unwrap();

        assert_eq!(args.api_base_url.as_str(), "https://api.symptoseek.example/");
        assert_eq!(args.token.as_deref(), Some("jwt-token"));
        assert_eq!(args.user_id.as_deref(), Some("665f1c2e9b1d8a0012ab34cd"));
        assert_eq!(args.latitude, Some(23.8103));
        assert_eq!(args.longitude, Some(90.4125));
    }
}

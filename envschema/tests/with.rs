use std::{fmt, str};

use envschema::{EnvSchema, ParseResult, Snapshot};

#[test]
fn with_into_parser() {
    #[derive(EnvSchema, Debug, PartialEq)]
    pub struct Config {
        #[env(from, default = "postgres://postgres@postgres/postgres", with = into)]
        database_url: String,
    }

    let expected = Config {
        database_url: "postgres://postgres@postgres/postgres".into(),
    };
    let actual = Config::validate(&Snapshot::new()).unwrap();

    assert_eq!(expected, actual);
}

#[test]
fn with_into_secret() {
    use secrecy::ExposeSecret;

    #[derive(EnvSchema, Debug)]
    pub struct Config {
        #[env(from = "API_KEY", with = into)]
        api_key: secrecy::SecretString,
    }

    let env = Snapshot::from_iter([("API_KEY", "definitely-not-an-api-key")]);
    let actual = Config::validate(&env).unwrap();

    assert_eq!(actual.api_key.expose_secret(), "definitely-not-an-api-key");
}

#[test]
fn with_flag_transform() {
    #[derive(EnvSchema, Debug, PartialEq)]
    pub struct Config {
        #[env(from = "DEBUG", with = flag)]
        debug: bool,
        #[env(from = "VERBOSE", default = "false", with = flag)]
        verbose: bool,
    }

    let env = Snapshot::from_iter([("DEBUG", "true"), ("VERBOSE", "yes")]);
    let expected = Config {
        debug: true,
        verbose: false,
    };

    assert_eq!(expected, Config::validate(&env).unwrap());
}

#[test]
fn with_list_transform() {
    #[derive(EnvSchema, Debug, PartialEq)]
    pub struct Config {
        #[env(from = "BROKERS", with = list)]
        brokers: Vec<String>,
    }

    let env = Snapshot::from_iter([("BROKERS", "a:9092, b:9092")]);
    let expected = Config {
        brokers: vec!["a:9092".to_owned(), "b:9092".to_owned()],
    };

    assert_eq!(expected, Config::validate(&env).unwrap());
}

#[test]
fn url_format_constraint() {
    #[derive(EnvSchema, Debug)]
    #[allow(unused)]
    pub struct Config {
        #[env(from = "SERVICE_URL")]
        service_url: url::Url,
    }

    let valid = Snapshot::from_iter([("SERVICE_URL", "https://example.com/api")]);
    assert_eq!(
        Config::validate(&valid).unwrap().service_url.host_str(),
        Some("example.com")
    );

    let invalid = Snapshot::from_iter([("SERVICE_URL", "not a url")]);
    let errors = Config::validate(&invalid).unwrap_err();
    assert!(
        errors
            .to_string()
            .contains("`Config.service_url` (SERVICE_URL): invalid value \"not a url\"")
    );
}

#[test]
fn enum_fields_use_from_str() {
    #[derive(Debug)]
    pub struct UnknownMode(String);

    impl fmt::Display for UnknownMode {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "unknown mode `{}`", self.0)
        }
    }

    impl std::error::Error for UnknownMode {}

    #[derive(Debug, PartialEq)]
    pub enum Mode {
        Development,
        Production,
    }

    impl str::FromStr for Mode {
        type Err = UnknownMode;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "development" => Ok(Self::Development),
                "production" => Ok(Self::Production),
                other => Err(UnknownMode(other.to_owned())),
            }
        }
    }

    #[derive(EnvSchema, Debug, PartialEq)]
    pub struct Config {
        #[env(from = "NODE_ENV", default = "development")]
        mode: Mode,
    }

    assert_eq!(
        Config::validate(&Snapshot::new()).unwrap().mode,
        Mode::Development
    );

    let env = Snapshot::from_iter([("NODE_ENV", "production")]);
    assert_eq!(Config::validate(&env).unwrap().mode, Mode::Production);

    let env = Snapshot::from_iter([("NODE_ENV", "staging")]);
    let errors = Config::validate(&env).unwrap_err();
    assert!(errors.to_string().contains("unknown mode `staging`"));
}

#[test]
fn with_custom_parser_function() {
    fn frobnicate(s: &str) -> ParseResult<u16> {
        let mut v = s.as_bytes().to_vec();
        v.rotate_left(2);
        let s = str::from_utf8(&v)?;
        s.strip_prefix("0o")
            .ok_or("not an octal".into())
            .and_then(|s| u16::from_str_radix(s, 8).map_err(|e| e.into()))
    }

    #[derive(EnvSchema, Debug, PartialEq)]
    pub struct Config {
        #[env(from = "SERVER_PORT", with = frobnicate)]
        port: u16,
    }

    let env = Snapshot::from_iter([("SERVER_PORT", "300o")]);

    assert_eq!(Config { port: 24 }, Config::validate(&env).unwrap());
}

#[test]
fn collection_types() {
    use foo::baz::Config;
    // simulate module structure
    mod foo {
        pub mod bar {
            use envschema::ParseResult;

            pub fn semicolon_separated(s: &str) -> ParseResult<Vec<String>> {
                Ok(s.split(';').map(ToOwned::to_owned).collect())
            }
        }

        pub mod baz {
            use envschema::EnvSchema;

            #[derive(EnvSchema, Debug, PartialEq)]
            pub struct Config {
                #[env(from = "KAFKA_TOPICS", with = super::bar::semicolon_separated)]
                pub topics: Vec<String>,
            }
        }
    }

    let expected = Config {
        topics: vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
    };

    let env = Snapshot::from_iter([("KAFKA_TOPICS", "a;b;c")]);

    assert_eq!(expected, Config::validate(&env).unwrap());
}

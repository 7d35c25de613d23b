use figment::Jail;
use people_core::db::DbTarget;
use people_server::{RouteLayout, Settings, SettingsError};
use std::net::SocketAddr;
use std::path::PathBuf;

fn required(jail: &mut Jail) {
    jail.set_env("SECRET_KEY", "test-secret");
    jail.set_env("DATABASE_URL", "sqlite::memory:");
}

#[test]
fn defaults_apply_when_only_required_values_are_set() {
    Jail::expect_with(|jail| {
        required(jail);

        let settings = Settings::from_env().map_err(|err| err.to_string())?;
        assert!(!settings.debug);
        assert_eq!(settings.secret_key.expose(), "test-secret");
        assert_eq!(settings.database, DbTarget::Memory);
        assert_eq!(
            settings.allowed_hosts,
            vec![".run.app", ".googleapis.com", "localhost", "127.0.0.1"]
        );
        assert_eq!(settings.frontend_origin, "http://localhost:3000");
        assert_eq!(settings.route_layout, RouteLayout::Combined);
        assert_eq!(settings.api_prefix, "");
        assert_eq!(
            settings.bind_addr,
            "0.0.0.0:8000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.list_path(), "/person/");
        assert_eq!(settings.create_path(), "/person/");
        Ok(())
    });
}

#[test]
fn missing_secret_key_is_reported_by_name() {
    Jail::expect_with(|jail| {
        jail.set_env("DATABASE_URL", "sqlite::memory:");

        match Settings::from_env() {
            Err(SettingsError::Missing(key)) => assert_eq!(key, "SECRET_KEY"),
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    });
}

#[test]
fn missing_database_url_is_reported_by_name() {
    Jail::expect_with(|jail| {
        jail.set_env("SECRET_KEY", "test-secret");

        match Settings::from_env() {
            Err(SettingsError::Missing(key)) => assert_eq!(key, "DATABASE_URL"),
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    });
}

#[test]
fn overrides_are_parsed_from_the_environment() {
    Jail::expect_with(|jail| {
        required(jail);
        jail.set_env("DATABASE_URL", "sqlite:///var/lib/people/db.sqlite3");
        jail.set_env("DEBUG", "True");
        jail.set_env("ALLOWED_HOSTS", "people.example.com, .internal");
        jail.set_env("FRONTEND_URL", "https://app.example.com/");
        jail.set_env("ROUTE_LAYOUT", "split");
        jail.set_env("API_PREFIX", "/api/");
        jail.set_env("HOST", "127.0.0.1");
        jail.set_env("PORT", "9000");
        jail.set_env("LOG_LEVEL", "DEBUG");

        let settings = Settings::from_env().map_err(|err| err.to_string())?;
        assert!(settings.debug);
        assert_eq!(
            settings.database,
            DbTarget::File(PathBuf::from("/var/lib/people/db.sqlite3"))
        );
        assert_eq!(
            settings.allowed_hosts,
            vec!["people.example.com", ".internal"]
        );
        assert_eq!(settings.frontend_origin, "https://app.example.com");
        assert_eq!(settings.route_layout, RouteLayout::Split);
        assert_eq!(settings.list_path(), "/api/person/");
        assert_eq!(settings.create_path(), "/api/person/create/");
        assert_eq!(
            settings.bind_addr,
            "127.0.0.1:9000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(settings.log_level, "debug");
        Ok(())
    });
}

#[test]
fn invalid_values_name_the_offending_variable() {
    Jail::expect_with(|jail| {
        required(jail);
        jail.set_env("PORT", "eighty");

        match Settings::from_env() {
            Err(SettingsError::Invalid { key, .. }) => assert_eq!(key, "PORT"),
            other => panic!("unexpected result: {other:?}"),
        }

        jail.set_env("PORT", "8000");
        jail.set_env("ROUTE_LAYOUT", "nested");
        match Settings::from_env() {
            Err(SettingsError::Invalid { key, .. }) => assert_eq!(key, "ROUTE_LAYOUT"),
            other => panic!("unexpected result: {other:?}"),
        }

        jail.set_env("ROUTE_LAYOUT", "combined");
        jail.set_env("DATABASE_URL", "postgres://db.internal/people");
        match Settings::from_env() {
            Err(SettingsError::Invalid { key, .. }) => assert_eq!(key, "DATABASE_URL"),
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    });
}

#[test]
fn secret_key_is_redacted_in_debug_output() {
    Jail::expect_with(|jail| {
        required(jail);

        let settings = Settings::from_env().map_err(|err| err.to_string())?;
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("test-secret"));
        assert!(rendered.contains("<redacted>"));
        Ok(())
    });
}

#[test]
fn values_are_read_verbatim_without_type_coercion() {
    Jail::expect_with(|jail| {
        required(jail);
        jail.set_env("SECRET_KEY", "00123");
        jail.set_env("ALLOWED_HOSTS", "[abc]");

        let settings = Settings::from_env().map_err(|err| err.to_string())?;
        assert_eq!(settings.secret_key.expose(), "00123");
        assert_eq!(settings.allowed_hosts, vec!["[abc]"]);

        jail.set_env("SECRET_KEY", "{not: a map}");
        let settings = Settings::from_env().map_err(|err| err.to_string())?;
        assert_eq!(settings.secret_key.expose(), "{not: a map}");
        Ok(())
    });
}

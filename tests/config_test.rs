#[cfg(test)]
mod tests {
    use sqldialect::tenant::ExecutionContext;
    use sqldialect::{DatabaseBackend, DialectResolver, SqlDialectConfig};
    use std::fs;
    use tempfile::TempDir;

    const BASE: &str = r#"
[database]
backend = "mysql"
timezone = "UTC"

[tenants.default]
url = "mysql://localhost:3306/fineract_default"

[tenants.eu]
backend = "postgres"
timezone = "+01:00"
"#;

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sqldialect.toml");
        fs::write(&path, BASE).unwrap();

        let config = SqlDialectConfig::from_file(&path).unwrap();
        assert_eq!(config.default_backend().unwrap(), DatabaseBackend::MySQL);
        assert_eq!(config.tenants.len(), 2);
        assert_eq!(
            config.tenant_backend("default").unwrap(),
            DatabaseBackend::MySQL
        );
    }

    #[test]
    fn test_from_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = SqlDialectConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert_eq!(err.error_code(), "E_IO");
        assert!(err.to_string().contains("absent.toml"));
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_invalid_file_keeps_cause() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sqldialect.toml");
        fs::write(&path, "[database]\nbackend = \"oracle\"\n").unwrap();

        let err = SqlDialectConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        assert_eq!(err.error_code(), "E_CONFIGURATION");
    }

    #[test]
    fn test_environment_file_overrides_base() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("sqldialect.toml"), BASE).unwrap();
        fs::write(
            dir.path().join(format!(
                "sqldialect.{}.toml",
                SqlDialectConfig::detect_environment().as_str()
            )),
            "[database]\nbackend = \"postgres\"\n\n[tenants.default]\nbackend = \"mariadb\"\n",
        )
        .unwrap();

        let config = SqlDialectConfig::load_with_base_dir(dir.path()).unwrap();
        // SQLDIALECT_BACKEND may be set by the surrounding environment
        if std::env::var("SQLDIALECT_BACKEND").is_err() {
            assert_eq!(config.default_backend().unwrap(), DatabaseBackend::Postgres);
        }
        assert_eq!(
            config.tenant_backend("default").unwrap(),
            DatabaseBackend::MariaDB
        );
        assert_eq!(
            config.tenant_backend("eu").unwrap(),
            DatabaseBackend::Postgres
        );
    }

    #[test]
    fn test_build_generator_from_config() {
        let config = SqlDialectConfig::from_toml_str(BASE).unwrap();
        let resolver = config.build_resolver().unwrap();
        assert_eq!(resolver.tenant_count(), 2);
        assert_eq!(resolver.current_backend().unwrap(), DatabaseBackend::MySQL);

        let generator = config.build_generator().unwrap();
        assert_eq!(generator.limit(1).unwrap(), "LIMIT 0,1");

        let _guard = ExecutionContext::for_tenant(config.tenant_context("eu").unwrap()).enter();
        assert_eq!(generator.limit(1).unwrap(), "LIMIT 1 OFFSET 0");
        assert_eq!(generator.escape("m_product_loan").unwrap(), "\"m_product_loan\"");
    }
}

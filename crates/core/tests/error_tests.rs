// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError display, detail and conversions
// ═══════════════════════════════════════════════════════════════════

use portfolio_tracker_core::errors::CoreError;

mod display {
    use super::*;

    #[test]
    fn business_errors() {
        assert_eq!(
            CoreError::PortfolioNotFound(3).to_string(),
            "Portfolio 3 does not exist"
        );
        assert_eq!(
            CoreError::AssetNotFound("ZZZ".into()).to_string(),
            "Asset not found: ZZZ"
        );
        assert_eq!(
            CoreError::ValidationError("bad".into()).to_string(),
            "Validation failed: bad"
        );
        assert_eq!(
            CoreError::MissingData("none".into()).to_string(),
            "Missing data: none"
        );
        assert_eq!(CoreError::Import("oops".into()).to_string(), "Import failed: oops");
    }

    #[test]
    fn storage_errors() {
        assert_eq!(
            CoreError::UnsupportedVersion(9).to_string(),
            "Unsupported file version: 9"
        );
        assert!(CoreError::Decryption.to_string().contains("wrong password"));
        assert!(CoreError::InvalidFileFormat("x".into())
            .to_string()
            .starts_with("Invalid file format"));
    }
}

mod detail {
    use super::*;

    #[test]
    fn strips_prefix_for_user_facing_variants() {
        assert_eq!(CoreError::ValidationError("bad".into()).detail(), "bad");
        assert_eq!(CoreError::MissingData("none".into()).detail(), "none");
        assert_eq!(CoreError::Import("oops".into()).detail(), "oops");
    }

    #[test]
    fn other_variants_use_display() {
        assert_eq!(
            CoreError::PortfolioNotFound(1).detail(),
            "Portfolio 1 does not exist"
        );
        assert_eq!(
            CoreError::AssetNotFound("A".into()).detail(),
            "Asset not found: A"
        );
    }
}

mod conversions {
    use super::*;

    #[test]
    fn from_io() {
        let err: CoreError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, CoreError::FileIO(ref m) if m.contains("gone")));
    }

    #[test]
    fn from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn from_csv() {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader("a,b\nc\n".as_bytes());
        let csv_err = reader.records().find_map(Result::err).unwrap();
        let err: CoreError = csv_err.into();
        assert!(matches!(err, CoreError::Import(ref m) if m.starts_with("Malformed CSV")));
    }

    #[test]
    fn from_aead() {
        let err: CoreError = aes_gcm::Error.into();
        assert!(matches!(err, CoreError::Decryption));
    }

    #[test]
    fn is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&CoreError::Decryption);
    }
}

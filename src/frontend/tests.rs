#[cfg(test)]
mod tests {
    use crate::frontend::process::ScratchDir;
    use crate::frontend::{
        build_command_line, parse_clang_diagnostics, parse_generator_diagnostics, Diagnostic,
        FrontendConfig, GenerationLevel, Invocation, MacroDefinition, ProcessFrontend, Severity,
        TranslationFlags,
    };
    use crate::model::Location;
    use std::path::{Path, PathBuf};

    fn invocation(flags: TranslationFlags) -> Invocation {
        Invocation {
            header: PathBuf::from("include/gl.h"),
            command_line: vec!["--language=c++".to_string(), "--define-macro=GL_API".to_string()],
            flags,
            included_names: vec!["glClear".to_string()],
            excluded_names: vec!["glInternal".to_string()],
            log_target: "header_scraper::tests".to_string(),
        }
    }

    // ========================================================================
    // Command line
    // ========================================================================

    #[test]
    fn test_command_line_order() {
        let config = FrontendConfig::default();
        let macros = vec![MacroDefinition::parse("FOO=1"), MacroDefinition::parse("BAR")];
        let dirs = vec![PathBuf::from("include"), PathBuf::from("third_party")];

        let args = build_command_line(&config, &macros, &dirs);

        assert_eq!(
            args,
            vec![
                "--language=c++",
                "--std=c++17",
                "-Wno-pragma-once-outside-header",
                "--define-macro=FOO=1",
                "--define-macro=BAR",
                "--include-directory=include",
                "--include-directory=third_party",
            ]
        );
    }

    #[test]
    fn test_command_line_has_no_platform_macros() {
        let args = build_command_line(&FrontendConfig::default(), &[], &[]);
        assert!(args.iter().all(|a| !a.starts_with("--define-macro")));
    }

    #[test]
    fn test_macro_parse() {
        assert_eq!(
            MacroDefinition::parse("WIN32"),
            MacroDefinition {
                name: "WIN32".to_string(),
                value: None,
            }
        );
        assert_eq!(
            MacroDefinition::parse("API=__declspec(dllimport)").value.as_deref(),
            Some("__declspec(dllimport)")
        );
        assert_eq!(MacroDefinition::parse("EMPTY=").value.as_deref(), Some(""));
    }

    #[test]
    fn test_macro_dedupe_last_wins_in_first_slot() {
        let merged = MacroDefinition::dedupe(["FOO=1", "BAR", "FOO=2"]);
        let args: Vec<String> = merged.iter().map(MacroDefinition::to_argument).collect();
        assert_eq!(args, vec!["--define-macro=FOO=2", "--define-macro=BAR"]);
    }

    // ========================================================================
    // Translation flags
    // ========================================================================

    #[test]
    fn test_default_flags() {
        let flags = TranslationFlags::default();
        assert!(flags.contains(TranslationFlags::DETAILED_PREPROCESSING_RECORD));
        assert!(flags.contains(TranslationFlags::KEEP_GOING));
        assert!(flags.contains(TranslationFlags::INCLUDE_ATTRIBUTED_TYPES));
        assert!(flags.contains(TranslationFlags::VISIT_IMPLICIT_ATTRIBUTES));
        assert_eq!(flags.bits(), 0x3201);
        assert!(!TranslationFlags::NONE.contains(TranslationFlags::KEEP_GOING));
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    #[test]
    fn test_parse_clang_diagnostics() {
        let stderr = "\
In file included from main.h:1:
gl.h:10:9: warning: 'GL_API' macro redefined [-Wmacro-redefined,Lexical or Preprocessor Issue]
#define GL_API
        ^
gl.h:12:20: error: expected ';' after top level declarator [Parse Issue]
fatal error: 'missing.h' file not found
1 warning and 2 errors generated.
";
        let diagnostics = parse_clang_diagnostics(stderr);

        assert_eq!(diagnostics.len(), 3);

        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].category, "Lexical or Preprocessor Issue");
        assert_eq!(diagnostics[0].message, "'GL_API' macro redefined");
        assert_eq!(diagnostics[0].location, Some((Location::new("gl.h", 10), 9)));

        assert_eq!(diagnostics[1].severity, Severity::Error);
        assert_eq!(diagnostics[1].category, "Parse Issue");

        assert_eq!(diagnostics[2].severity, Severity::Fatal);
        assert_eq!(diagnostics[2].category, "");
        assert_eq!(diagnostics[2].location, None);
    }

    #[test]
    fn test_parse_generator_diagnostics() {
        let output = "\
Processing 'gl.h'
Warning: Function has a conflicting name (gl.h:40:6)
Error: Unsupported callconv: 'Swift'
Info: Skipping unreferenced declaration
";
        let diagnostics = parse_generator_diagnostics(output);

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics[0].level, GenerationLevel::Warning);
        assert_eq!(diagnostics[0].message, "Function has a conflicting name");
        assert_eq!(diagnostics[0].location.as_deref(), Some("gl.h:40:6"));
        assert_eq!(diagnostics[1].level, GenerationLevel::Error);
        assert_eq!(diagnostics[1].location, None);
        assert_eq!(diagnostics[2].level, GenerationLevel::Info);
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Ignored < Severity::Note);
        assert!(Severity::Warning < Severity::Error);
        assert!(!Severity::Warning.is_fatal());
        assert!(Severity::Error.is_fatal());
        assert!(Severity::Fatal.is_fatal());
    }

    #[test]
    fn test_diagnostic_format() {
        let bare = Diagnostic::new(Severity::Error, "Parse Issue", "expected ';'");
        assert_eq!(bare.format(), "error: expected ';'");

        let located = bare.at(Location::new("gl.h", 12), 20);
        assert_eq!(located.format(), "gl.h:12:20: error: expected ';'");
    }

    // ========================================================================
    // Process frontend
    // ========================================================================

    #[test]
    fn test_clang_arguments_follow_flags() {
        let args = ProcessFrontend::clang_arguments(&invocation(TranslationFlags::default()));

        assert_eq!(args[0], "-fsyntax-only");
        assert!(args.contains(&"-ferror-limit=0".to_string()));
        assert!(args.contains(&"-detailed-preprocessing-record".to_string()));
        assert!(args.contains(&"--define-macro=GL_API".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("include/gl.h"));

        let plain = ProcessFrontend::clang_arguments(&invocation(TranslationFlags::NONE));
        assert!(!plain.contains(&"-ferror-limit=0".to_string()));
        assert!(!plain.contains(&"-Xclang".to_string()));
    }

    #[test]
    fn test_generator_arguments() {
        let args =
            ProcessFrontend::generator_arguments(&invocation(TranslationFlags::NONE), Path::new("out"));
        let pairs: Vec<(&str, &str)> = args
            .chunks(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
            .collect();

        assert!(pairs.contains(&("--file", "include/gl.h")));
        assert!(pairs.contains(&("--output-mode", "Xml")));
        assert!(pairs.contains(&("--namespace", "LIBRARY_NAMESPACE")));
        assert!(pairs.contains(&("--libraryPath", "LIBRARY_PATH")));
        assert!(pairs.contains(&("--traverse", "glClear")));
        assert!(pairs.contains(&("--exclude", "glInternal")));
        assert!(pairs.contains(&("--additional", "--language=c++")));
        assert!(pairs.iter().any(|(flag, path)| *flag == "--output" && path.starts_with("out")));
    }

    #[test]
    fn test_scratch_dir_removed_on_drop() {
        let root = std::env::temp_dir();
        let scratch = ScratchDir::create(&root).unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::write(path.join("bindings.xml"), "<bindings/>").unwrap();
        assert!(path.is_dir());

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_unavailable_program() {
        let config = FrontendConfig {
            clang_path: PathBuf::from("/nonexistent/clang-for-tests"),
            ..FrontendConfig::default()
        };
        let frontend = ProcessFrontend::new(&config);

        let result = crate::frontend::Frontend::parse(&frontend, &invocation(TranslationFlags::NONE));
        assert!(matches!(
            result,
            Err(crate::scraper::ScrapeError::FrontendUnavailable { .. })
        ));
    }

    // ========================================================================
    // Config
    // ========================================================================

    #[test]
    fn test_config_partial_json_keeps_defaults() {
        let config: FrontendConfig =
            serde_json::from_str(r#"{ "standard": "c11", "language": "c" }"#).unwrap();

        assert_eq!(config.standard, "c11");
        assert_eq!(config.language, "c");
        assert_eq!(config.clang_path, PathBuf::from("clang"));
        assert_eq!(config.translation_flags, TranslationFlags::default());
        assert_eq!(config.scratch_root(), std::env::temp_dir());
    }

    #[test]
    fn test_config_flags_as_bits() {
        let config: FrontendConfig = serde_json::from_str(r#"{ "translation_flags": 512 }"#).unwrap();
        assert_eq!(config.translation_flags, TranslationFlags::KEEP_GOING);
    }
}

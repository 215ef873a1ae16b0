use super::*;

#[test]
fn parses_price_command() {
    let cli = Cli::try_parse_from([
        "rxprice-cli",
        "price",
        "--enterprise",
        "1042",
        "--serial",
        "77",
        "--branch",
        "ab-1",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Price {
            enterprise: 1042,
            serial: 77,
            ref branch,
            dry_run: false,
            ..
        } if branch == "ab-1"
    ));
}

#[test]
fn parses_price_overrides() {
    let cli = Cli::try_parse_from([
        "rxprice-cli",
        "price",
        "--enterprise",
        "1",
        "--serial",
        "2",
        "--branch",
        "X",
        "--prices",
        "100,300,500",
        "--distances",
        "300,1000",
        "--deviation",
        "0.01",
        "--dry-run",
    ])
    .expect("expected valid cli args");

    let Commands::Price {
        settings, dry_run, ..
    } = cli.command
    else {
        panic!("expected price command");
    };
    assert!(dry_run);
    let overrides = settings.overrides();
    assert_eq!(overrides.prices, Some(vec![100.0, 300.0, 500.0]));
    assert_eq!(overrides.distances, Some(vec![300.0, 1000.0]));
    assert_eq!(overrides.deviation, Some(0.01));
    assert_eq!(overrides.default_unit, None);
}

#[test]
fn price_requires_branch() {
    let result = Cli::try_parse_from([
        "rxprice-cli",
        "price",
        "--enterprise",
        "1",
        "--serial",
        "2",
    ]);
    assert!(result.is_err());
}

#[test]
fn parses_run_and_schedule_commands() {
    let cli = Cli::try_parse_from(["rxprice-cli", "run"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Run { .. }));

    let cli = Cli::try_parse_from(["rxprice-cli", "schedule", "--cron", "0 */5 * * * *"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Schedule { cron: Some(ref c), .. } if c == "0 */5 * * * *"
    ));
}

#[test]
fn missing_command_is_an_error() {
    assert!(Cli::try_parse_from(["rxprice-cli"]).is_err());
}

#[test]
fn no_overrides_is_empty() {
    assert!(SettingsArgs::default().overrides().is_empty());
}

#[test]
fn resolve_applies_overrides_to_file() {
    let path = std::env::temp_dir().join(format!("rxprice-cli-settings-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "prices: [100, 300]\ndistances: [300, 1000]\ndefault_unit: 100\ndefault_unit_price: 2\ndeviation: 0.005\n",
    )
    .unwrap();

    let args = SettingsArgs {
        path: Some(path.clone()),
        deviation: Some(0.01),
        ..SettingsArgs::default()
    };
    let settings = args.resolve(None).unwrap();
    assert!((settings.deviation - 0.01).abs() < 1e-12);
    assert_eq!(settings.prices, vec![100.0, 300.0]);

    let bad = SettingsArgs {
        path: Some(path.clone()),
        distances: Some(vec![1000.0, 300.0]),
        ..SettingsArgs::default()
    };
    assert!(bad.resolve(None).is_err());

    std::fs::remove_file(&path).unwrap();
}

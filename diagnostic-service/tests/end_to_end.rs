use diagnostic_service::{
    analysis::{DiagnosticBundle, Section, GENERIC_ERROR},
    report,
    sources::MeasurementCsvSource,
};
use motor_client::domain::Ratings;

const EXPORT: &str = "\
Time;AVRMS;BVRMS;CVRMS;AIRMS;BIRMS;CIRMS;AFP;BFP;CFP;DIA;Operator
01/05/2024 00:00:00;380;381;379;20;20;20;0,96;0,96;0,96;5;ana
01/05/2024 01:00:00;382;380;381;21;20,5;20;0,96;0,95;0,97;0;ana
garbage;380;380;380;20;20;20;0,96;0,96;0,96;99;ana
01/05/2024 02:00:00;381;380;380;20;20;20;0,96;0,96;0,96;12,5;ana
";

fn ratings() -> Ratings {
    Ratings::new(Some(25.0), Some(380.0))
}

#[tokio::test]
async fn export_to_bundle() {
    let source = MeasurementCsvSource::from_bytes(EXPORT.as_bytes().to_vec());
    let bundle = report::diagnose(source, ratings()).await.unwrap();

    assert!(!bundle.is_degraded());
    assert_eq!(bundle.get(Section::NominalVoltage), Some("380"));
    assert!(bundle.get(Section::Voltage).unwrap().starts_with("Analysis based on a nominal reference voltage of 380 V."));
    assert!(bundle.get(Section::PowerFactor).unwrap().contains("Diagnosis: IDEAL."));
    // The garbage row is dropped, so its counter reading never shows up.
    assert_eq!(
        bundle.get(Section::Accessories),
        Some("Latest flow totalizer readings:\n- Daily flow (m³): 12.50")
    );
    assert!(bundle
        .get(Section::FinalConclusion)
        .unwrap()
        .starts_with("General diagnosis: CONFORMANT."));

    let json = serde_json::to_value(&bundle).unwrap();
    for section in Section::ALL {
        assert!(json.get(section.key()).is_some(), "missing {}", section.key());
    }
}

#[tokio::test]
async fn same_export_yields_same_fingerprint() {
    let first = report::diagnose(MeasurementCsvSource::from_bytes(EXPORT.as_bytes().to_vec()), ratings())
        .await
        .unwrap();
    let second = report::diagnose(MeasurementCsvSource::from_bytes(EXPORT.as_bytes().to_vec()), ratings())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[tokio::test]
async fn export_without_voltage_is_degraded() {
    let csv = "Time;AIRMS;BIRMS;CIRMS\n01/05/2024 00:00:00;20;20;20\n";
    let bundle = report::diagnose(MeasurementCsvSource::from_bytes(csv.as_bytes().to_vec()), ratings())
        .await
        .unwrap();

    assert_eq!(bundle, DiagnosticBundle::degraded(Some(380.0)));
    assert_eq!(bundle.get(Section::Current), Some(GENERIC_ERROR));
}

#[tokio::test]
async fn comma_delimited_export() {
    let csv = "Time,AVRMS,BVRMS,CVRMS\n2024-05-01 00:00:00,380,380,380\n";
    let source = MeasurementCsvSource::from_bytes(csv.as_bytes().to_vec()).with_delimiter(b',');
    let bundle = report::diagnose(source, ratings()).await.unwrap();

    assert!(!bundle.is_degraded());
    assert!(bundle.get(Section::Current).unwrap().contains("requires all three phase columns"));
}

#[tokio::test]
async fn samples_from_a_reset_clock_still_count() {
    let csv = "Time;AVRMS;BVRMS;CVRMS\n\
               31/12/1999 23:00:00;450;380;380\n\
               01/05/2024 00:00:00;380;380;380\n";
    let bundle = report::diagnose(MeasurementCsvSource::from_bytes(csv.as_bytes().to_vec()), ratings())
        .await
        .unwrap();

    assert!(bundle.get(Section::Voltage).unwrap().contains("max 450.0 V"));
    assert!(bundle
        .get(Section::FinalConclusion)
        .unwrap()
        .starts_with("General diagnosis: NON-CONFORMANT."));
}

use anyhow::Result;
use httpmock::prelude::*;
use parcel_query::domain::model::QueryNotice;
use parcel_query::domain::ports::ExportFormat;
use parcel_query::{
    ArcGisClient, FieldCatalog, FieldName, LocalStorage, MatchMode, QueryEngine, QuerySpec,
};
use std::io::Read;
use tempfile::TempDir;

fn parcel_features() -> serde_json::Value {
    serde_json::json!({
        "objectIdFieldName": "OBJECTID",
        "features": [
            {
                "attributes": {
                    "PARCELID": "0608-123-4567",
                    "OWNERNME1": "SMITH JOHN",
                    "GISACRES": 12.5,
                    "LATITUDE": 44.5,
                    "LONGITUDE": -89.5
                }
            },
            {
                "attributes": {
                    "PARCELID": "0608-123-9999",
                    "OWNERNME1": "SMITHFIELD LLC",
                    "GISACRES": 7.25,
                    "LATITUDE": null,
                    "LONGITUDE": -89.1
                }
            }
        ]
    })
}

#[tokio::test]
async fn test_end_to_end_query_and_xlsx_export() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_string_lossy().into_owned();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/FeatureServer/0/query")
            .query_param("where", "OWNERNME1 LIKE '%SMITH%' AND GISACRES > 5")
            .query_param("outFields", "PARCELID,OWNERNME1,LATITUDE,LONGITUDE")
            .query_param("f", "json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(parcel_features());
    });

    let client = ArcGisClient::new(server.url("/FeatureServer/0/query"), false)?;
    let engine = QueryEngine::new(client, FieldCatalog::wisconsin_parcels());
    let spec = QuerySpec::new(
        FieldName::OwnerName1,
        vec![FieldName::ParcelId, FieldName::OwnerName1],
    )
    .with_value("SMITH", MatchMode::Partial)
    .with_min_acres(5.0);

    let report = engine.run(&spec).await;
    api_mock.assert();

    assert!(report.notice.is_none());
    assert_eq!(report.predicate, "OWNERNME1 LIKE '%SMITH%' AND GISACRES > 5");
    assert_eq!(report.results.len(), 2);
    assert_eq!(
        report.results.records[0].map_link,
        "https://www.google.com/maps/search/?api=1&query=44.5,-89.5"
    );
    assert_eq!(report.results.records[1].map_link, "");

    let display = report.results.display_view();
    assert!(display.column("LATITUDE").is_some());
    assert!(display.column("GISACRES").is_some());

    let storage = LocalStorage::new(output_path.clone());
    let (artifact, path) = engine
        .export(&report, &storage, ExportFormat::Xlsx, None)
        .await?
        .expect("results should be exported");

    assert_eq!(artifact.file_name, "parcel_results.xlsx");
    assert!(path.ends_with("parcel_results.xlsx"));

    let full_path = std::path::Path::new(&output_path).join("parcel_results.xlsx");
    assert!(full_path.exists());

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(std::fs::read(&full_path)?))?;
    let mut sheet = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")?
        .read_to_string(&mut sheet)?;

    assert!(sheet.contains(">PARCELID<"));
    assert!(sheet.contains(">OWNERNME1<"));
    assert!(sheet.contains(">Google Maps Link<"));
    assert!(sheet.contains("SMITHFIELD LLC"));
    assert!(!sheet.contains("LATITUDE"));
    assert!(!sheet.contains("LONGITUDE"));

    Ok(())
}

#[tokio::test]
async fn test_http_404_is_reported_not_raised() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/query");
        then.status(404);
    });

    let client = ArcGisClient::new(server.url("/query"), false)?;
    let engine = QueryEngine::new(client, FieldCatalog::default());
    let spec = QuerySpec::new(FieldName::ParcelId, vec![FieldName::ParcelId]);

    let report = engine.run(&spec).await;

    api_mock.assert();
    assert_eq!(report.predicate, "1=1");
    assert_eq!(report.notice, Some(QueryNotice::HttpFailure { status: 404 }));
    assert!(report.results.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_response_without_features_is_reported() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/query");
        then.status(200).json_body(serde_json::json!({"count": 0}));
    });

    let client = ArcGisClient::new(server.url("/query"), false)?;
    let engine = QueryEngine::new(client, FieldCatalog::default());
    let spec = QuerySpec::new(FieldName::ParcelId, vec![FieldName::ParcelId]);

    let report = engine.run(&spec).await;
    assert_eq!(report.notice, Some(QueryNotice::NoFeatures { detail: None }));
    assert!(report.results.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unreachable_service_degrades_to_notice() -> Result<()> {
    // port 1 沒有服務在聽，連線會被拒絕
    let client = ArcGisClient::new("http://127.0.0.1:1/query", false)?;
    let engine = QueryEngine::new(client, FieldCatalog::default());
    let spec = QuerySpec::new(FieldName::ParcelId, vec![FieldName::ParcelId]);

    let report = engine.run(&spec).await;
    assert!(matches!(report.notice, Some(QueryNotice::Transport { .. })));
    assert!(report.results.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_no_fields_selected_sends_nothing() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/query");
        then.status(200).json_body(parcel_features());
    });

    let client = ArcGisClient::new(server.url("/query"), false)?;
    let engine = QueryEngine::new(client, FieldCatalog::default());
    let spec = QuerySpec::new(FieldName::OwnerName1, Vec::new()).with_value("SMITH", MatchMode::Exact);

    let report = engine.run(&spec).await;

    api_mock.assert_hits(0);
    assert_eq!(report.notice, Some(QueryNotice::NoFieldsSelected));
    Ok(())
}

#[tokio::test]
async fn test_csv_export_keeps_selected_coordinates() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_string_lossy().into_owned();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/query")
            .query_param("outFields", "LATITUDE,PARCELID,LONGITUDE");
        then.status(200).json_body(parcel_features());
    });

    let client = ArcGisClient::new(server.url("/query"), false)?;
    let engine = QueryEngine::new(client, FieldCatalog::default());
    let spec = QuerySpec::new(
        FieldName::ParcelId,
        vec![FieldName::Latitude, FieldName::ParcelId],
    );

    let report = engine.run(&spec).await;
    assert_eq!(report.results.len(), 2);

    let storage = LocalStorage::new(output_path.clone());
    engine
        .export(&report, &storage, ExportFormat::Csv, Some("coords.csv"))
        .await?;

    let csv_content = std::fs::read_to_string(temp_dir.path().join("coords.csv"))?;
    let mut lines = csv_content.lines();
    assert_eq!(lines.next(), Some("LATITUDE,PARCELID,Google Maps Link"));
    assert_eq!(
        lines.next(),
        Some(r#"44.5,0608-123-4567,"https://www.google.com/maps/search/?api=1&query=44.5,-89.5""#)
    );
    assert_eq!(lines.next(), Some(",0608-123-9999,"));
    Ok(())
}

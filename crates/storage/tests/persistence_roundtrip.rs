use chrono::{Duration, TimeZone, Utc};
use shared::domain::{Classification, EncodedImage, VisitForm, VisitorId, VisitorRecord};
use storage::{decode_visitors, encode_visitors, JsonFileStore, VisitorBook, VISITORS_KEY};

fn visitors() -> Vec<VisitorRecord> {
    let base = Utc
        .with_ymd_and_hms(2024, 7, 1, 7, 30, 0)
        .single()
        .expect("timestamp");

    let with_everything = VisitorRecord::new(
        &VisitForm {
            name: "Ibu Ratna".to_string(),
            institution: "Dinas Pendidikan".to_string(),
            phone: "0813".to_string(),
            purpose: "Supervisi".to_string(),
        },
        Some(EncodedImage::jpeg(&[0xff, 0xd8, 0xff, 0xe0])),
        Some(EncodedImage::png(&[0x89, b'P', b'N', b'G'])),
        Classification::new("Dinas", "Terima kasih atas kunjungan supervisinya."),
        base + Duration::minutes(5),
    );

    let bare = VisitorRecord {
        id: VisitorId("1719819000000".to_string()),
        timestamp: base,
        name: "Budi".to_string(),
        institution: String::new(),
        phone: String::new(),
        purpose: "Mengantar paket".to_string(),
        photo_image: None,
        signature_image: None,
        category: None,
        summary_message: None,
    };

    vec![with_everything, bare]
}

#[test]
fn encoded_list_decodes_to_identical_records() {
    let list = visitors();
    let decoded = decode_visitors(&encode_visitors(&list).expect("encode")).expect("decode");
    assert_eq!(decoded, list);
}

#[test]
fn file_backed_book_round_trips_across_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let list = visitors();

    {
        let store = JsonFileStore::open_in_dir(dir.path()).expect("open");
        let mut book = VisitorBook::open(store).expect("book");
        for record in list.iter().rev().cloned() {
            book.prepend(record).expect("prepend");
        }
    }

    let store = JsonFileStore::open_in_dir(dir.path()).expect("reopen");
    let book = VisitorBook::open(store).expect("book");
    assert_eq!(book.visitors(), list.as_slice());
}

#[test]
fn legacy_web_export_loads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let legacy_list = r#"[{"id":"1719819000000","timestamp":"2024-07-01T07:30:00.000Z","name":"Budi","institution":"","phone":"","purpose":"Mengantar paket","photoUrl":null,"signatureUrl":null,"aiSummary":"Terima kasih Bapak/Ibu Budi sudah berkunjung.","aiCategory":"Umum"}]"#;
    {
        let mut store = JsonFileStore::open_in_dir(dir.path()).expect("open");
        storage::KeyValueStore::set(&mut store, VISITORS_KEY, legacy_list).expect("seed");
    }

    let book = VisitorBook::open(JsonFileStore::open_in_dir(dir.path()).expect("reopen"))
        .expect("book");
    assert_eq!(book.len(), 1);
    assert_eq!(book.visitors()[0].name, "Budi");
    assert_eq!(
        book.visitors()[0].summary_message.as_deref(),
        Some("Terima kasih Bapak/Ibu Budi sudah berkunjung.")
    );
}

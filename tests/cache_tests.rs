use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use promptcache::cache::{cache_key, load_cache_file, persist_entry};
use promptcache::{CacheStore, Error, Turn};

#[test]
fn test_cache_key_layout()
{   let prompt = vec![Turn::system("Be brief."), Turn::user("hi")];
    assert_eq!(
      assert_ok!(cache_key(&prompt)),
      r#"[{"role": "system", "content": "Be brief."}, {"role": "user", "content": "hi"}]"#
    );
}

#[test]
fn test_cache_key_escapes_non_ascii()
{   let prompt = vec![Turn::user("café 😀\n\"q\"")];
    assert_eq!(
      assert_ok!(cache_key(&prompt)),
      r#"[{"role": "user", "content": "caf\u00e9 \ud83d\ude00\n\"q\""}]"#
    );
}

#[test]
fn test_equal_prompts_share_a_key()
{   let a = vec![Turn::user("same"), Turn::assistant("reply")];
    let b = vec![Turn::user("same".to_string()), Turn::assistant("reply")];
    assert_eq!(assert_ok!(cache_key(&a)), assert_ok!(cache_key(&b)));
    let c = vec![Turn::system("same"), Turn::assistant("reply")];
    assert_ne!(assert_ok!(cache_key(&a)), assert_ok!(cache_key(&c)));
}

#[tokio::test]
async fn test_missing_file_is_empty_cache()
{   let dir = tempfile::tempdir().unwrap();
    let cache = assert_ok!(load_cache_file(dir.path().join("nope.jsonl")).await);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_persisted_entries_load_back()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.jsonl");
    let response = json!({
      "choices": [{ "message": { "content": "ok" } }],
      "usage": { "prompt_tokens": 3, "completion_tokens": 1 },
    });
    assert_ok!(persist_entry("[\"k1\"]", &response, &path).await);
    assert_ok!(persist_entry("[\"k2\"]", &json!("plain"), &path).await);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);
    assert_eq!(
      contents.lines().nth(1).unwrap(),
      r#"{"prompt": "[\"k2\"]", "completion": "plain"}"#
    );

    let cache = assert_ok!(load_cache_file(&path).await);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache["[\"k1\"]"], response);
    assert_eq!(cache["[\"k2\"]"], json!("plain"));
}

#[tokio::test]
async fn test_last_record_wins()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.jsonl");
    assert_ok!(persist_entry("key", &json!("old"), &path).await);
    assert_ok!(persist_entry("key", &json!("new"), &path).await);

    let store = assert_ok!(CacheStore::open(&path).await);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("key"), Some(&json!("new")));
}

#[tokio::test]
async fn test_malformed_line_fails_load()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.jsonl");
    std::fs::write(
      &path,
      "{\"prompt\": \"a\", \"completion\": \"b\"}\nnot json\n"
    ).unwrap();

    let err = assert_err!(load_cache_file(&path).await);
    assert!(matches!(err, Error::CacheDecode { line: 2, .. }));
}

#[tokio::test]
async fn test_invalid_utf8_line_is_a_decode_error()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.jsonl");
    let mut bytes = b"{\"prompt\": \"a\", \"completion\": \"b\"}\r\n".to_vec();
    bytes.extend_from_slice(b"{\"prompt\": \"\xff\xfe\", \"completion\": \"c\"}\n");
    std::fs::write(&path, bytes).unwrap();

    let err = assert_err!(CacheStore::open(&path).await);
    assert!(matches!(err, Error::CacheDecode { line: 2, .. }));
}

#[tokio::test]
async fn test_record_without_completion_fails_load()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.jsonl");
    std::fs::write(&path, "{\"prompt\": \"a\"}\n").unwrap();

    let err = assert_err!(CacheStore::open(&path).await);
    assert!(matches!(err, Error::CacheDecode { line: 1, .. }));
}

#[tokio::test]
async fn test_store_insert_appends_immediately()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.jsonl");
    let mut store = assert_ok!(CacheStore::open(&path).await);
    let key = assert_ok!(cache_key(&[Turn::user("hello")]));
    assert_ok!(store.insert(key.clone(), json!("world")).await);

    let on_disk = assert_ok!(load_cache_file(&path).await);
    assert_eq!(on_disk.get(&key), Some(&json!("world")));
    assert!(store.is_complete(&key, false));
    assert!(!store.is_complete(&key, true));
    assert!(!store.is_complete("missing", false));
}

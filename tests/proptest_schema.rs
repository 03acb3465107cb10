//! Property-based tests using proptest
//!
//! These tests verify title generation, payload construction and item
//! addressing over randomized inputs.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wordbook::api::{ApiSettings, ServiceClient};
use wordbook::resource::title::{
    generate_title_with, is_generated_title, GENERATED_SUFFIX_LEN, GENERATED_TITLE_PREFIX,
    SUFFIX_ALPHABET,
};
use wordbook::resource::{Book, BookIdentity, BookKind, BookSchema, ResourceKind, TitlePolicy};

fn client() -> ServiceClient {
    ServiceClient::new(ApiSettings::new("http://localhost:8010").unwrap()).unwrap()
}

proptest! {
    /// Every generated title has the prefix plus 16 alphabet characters
    #[test]
    fn generated_titles_have_fixed_shape(seed in any::<u64>()) {
        let title = generate_title_with(&mut StdRng::seed_from_u64(seed));
        let suffix = title.strip_prefix(GENERATED_TITLE_PREFIX).unwrap();
        prop_assert_eq!(suffix.len(), GENERATED_SUFFIX_LEN);
        prop_assert!(suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b)));
    }

    /// A non-empty title is sent as given and desired state is untouched
    #[test]
    fn given_titles_are_preserved(title in "[^\\x00]{1,40}", author in ".{0,20}") {
        let kind = BookKind::default();
        let mut desired = Book::new(title.clone(), author.clone());
        let request = kind.encode(&mut desired).unwrap();
        prop_assert_eq!(&request.title, &title);
        prop_assert_eq!(&request.author, &author);
        prop_assert_eq!(desired, Book::new(title, author));
    }

    /// A blank title always leaves desired and payload agreeing on a generated value
    #[test]
    fn blank_titles_are_generated(author in ".{0,20}") {
        let kind = BookKind::default();
        let mut desired = Book::new("", author.clone());
        let request = kind.encode(&mut desired).unwrap();
        prop_assert!(is_generated_title(&request.title));
        prop_assert_eq!(&desired.title, &request.title);
        prop_assert_eq!(request.author, author);
    }

    /// The externally visible key is the id or the title, never anything else
    #[test]
    fn identity_key_follows_schema(id in "[a-f0-9-]{1,36}", title in ".{1,30}") {
        let book = Book::new(title.clone(), "");
        let by_id = BookKind::new(BookSchema {
            title: TitlePolicy::Generated,
            identity: BookIdentity::ServerId,
        });
        let by_title = BookKind::new(BookSchema {
            title: TitlePolicy::Generated,
            identity: BookIdentity::Title,
        });
        prop_assert_eq!(by_id.identity_key(&id, &book), id);
        prop_assert_eq!(by_title.identity_key("ignored", &book), title);
    }

    /// Any identifier stays inside one path segment of the item URL
    #[test]
    fn item_url_is_single_segment(id in ".{1,40}") {
        prop_assume!(id != "." && id != "..");
        let url = url::Url::parse(&client().item_url("books", &id)).unwrap();
        let segments: Vec<&str> = url.path_segments().unwrap().collect();
        prop_assert_eq!(segments.len(), 2);
        prop_assert_eq!(segments[0], "books");
        let decoded = urlencoding::decode(segments[1]).unwrap();
        prop_assert_eq!(decoded.as_ref(), id.as_str());
        prop_assert!(url.query().is_none());
    }
}

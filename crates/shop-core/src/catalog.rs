//! Book Catalog
//!
//! The storefront's fixed inventory. Entries are built once and never mutated.

use std::sync::OnceLock;

use rust_decimal_macros::dec;

use crate::model::Book;

const IMAGE_BASE: &str = "https://images.unsplash.com";

static CATALOG: OnceLock<Vec<Book>> = OnceLock::new();

fn book(id: &str, title: &str, price: rust_decimal::Decimal, photo: &str, description: &str) -> Book {
    Book {
        id: id.into(),
        title: title.into(),
        price,
        image_url: format!("{IMAGE_BASE}/{photo}?w=400&h=600&fit=crop"),
        description: description.into(),
    }
}

/// All books for sale, in display order
pub fn books() -> &'static [Book] {
    CATALOG.get_or_init(|| {
        vec![
            book(
                "1",
                "The Great Gatsby",
                dec!(12.99),
                "photo-1544947950-fa07a98d237f",
                "Nick Carraway watches his neighbour Jay Gatsby chase Daisy Buchanan through the Jazz Age.",
            ),
            book(
                "2",
                "To Kill a Mockingbird",
                dec!(14.99),
                "photo-1507003211169-0a1dd7228f2d",
                "Scout Finch grows up in a Southern town torn by a trial about race and justice.",
            ),
            book(
                "3",
                "1984",
                dec!(13.99),
                "photo-1532012197267-da84d127e765",
                "Winston Smith works for the Party in a state that watches everything.",
            ),
            book(
                "4",
                "Pride and Prejudice",
                dec!(11.99),
                "photo-1481627834876-b7833e8f5570",
                "Elizabeth Bennet and Mr. Darcy misjudge each other across the English gentry.",
            ),
            book(
                "5",
                "The Catcher in the Rye",
                dec!(15.99),
                "photo-1512820790803-83ca734da794",
                "Holden Caulfield drifts through New York after leaving school.",
            ),
            book(
                "6",
                "Lord of the Flies",
                dec!(12.49),
                "photo-1516979187457-637abb4f9353",
                "Stranded schoolboys try to govern themselves on a deserted island.",
            ),
        ]
    })
}

/// Look a book up by id
pub fn find(id: &str) -> Option<&'static Book> {
    books().iter().find(|b| b.id == id)
}

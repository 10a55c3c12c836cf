//! `taoloop books`: List the book catalog.

use taoloop_tools::BookCatalog;

pub fn run() {
    let catalog = BookCatalog::builtin();

    println!("Books in the catalog ({}):", catalog.len());
    println!();
    for title in catalog.titles() {
        if let Some(book) = catalog.lookup(title) {
            println!("  {:<22} {} ({})", book.title, book.author, book.year);
        }
    }
}

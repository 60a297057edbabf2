mod fetched_page;
mod page_fetcher;
mod page_source;

pub use fetched_page::FetchedPage;
pub use page_fetcher::PageFetcher;
pub use page_source::PageSource;

pub mod console_usecase;

pub use console_usecase::ConsoleUseCase;

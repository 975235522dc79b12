mod detect;
mod document;
mod encode;
mod value;

mod blog;
mod policies;

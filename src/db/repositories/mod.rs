mod sessions;
mod subjects;
mod tasks;

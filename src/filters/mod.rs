pub mod gzip;

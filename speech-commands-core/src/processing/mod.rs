pub mod sample_buffer;

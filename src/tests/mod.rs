#[cfg(test)]
mod fakes;

#[cfg(test)]
mod model_tests;


#[cfg(test)]
mod editor_session_tests;
